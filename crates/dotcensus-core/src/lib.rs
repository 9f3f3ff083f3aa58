#![forbid(unsafe_code)]

//! Data model for the census dot chart (headless).
//!
//! Holds everything the layout engine consumes that is not geometry or
//! physics: census records and the CSV feed they arrive on, the ordinal
//! color palette, and the chart configuration. No rendering happens here.

pub mod color;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geom;
pub mod record;

pub use color::{DEFAULT_PALETTE, OrdinalScale, hex_to_rgba};
pub use config::ChartConfig;
pub use dataset::{CsvFileSource, RecordSource, StaticSource, parse_census_csv};
pub use error::{Error, Result};
pub use record::{Record, Selection};
