#![forbid(unsafe_code)]

//! Headless layout and SVG rendering for the census dot chart.

pub mod model;
pub mod session;
pub mod svg;
pub mod text;

pub use model::{AnchorLayout, ChartLayout, GroupLayout, LabelLayout, NodeLayout};
pub use session::{ChartOptions, ChartSession};
pub use svg::render_svg;
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle, wrap_text};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("census data: {0}")]
    Data(#[from] dotcensus_core::Error),
    #[error("layout engine: {0}")]
    Engine(#[from] shoal::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
