#![forbid(unsafe_code)]

//! Census dot chart: one dot per person, force-packed into answer groups.
//!
//! The base crate re-exports the data model from `dotcensus-core`: census
//! [`Record`]s, [`RecordSource`] loaders, the [`Selection`] of a measure and
//! comparison, and the [`ChartConfig`] geometry.
//!
//! # Features
//!
//! - `render`: layout sessions and SVG output (the [`render`] module).

pub use dotcensus_core::*;

#[cfg(feature = "render")]
pub mod render {
    //! Layout and SVG rendering, re-exported from `dotcensus-render`.

    pub use dotcensus_render::{
        AnchorLayout, ChartLayout, ChartOptions, ChartSession, DeterministicTextMeasurer, Error,
        GroupLayout, LabelLayout, NodeLayout, Result, TextMeasurer, TextMetrics, TextStyle,
        render_svg, wrap_text,
    };

    use dotcensus_core::{ChartConfig, CsvFileSource, RecordSource};
    use std::path::PathBuf;

    /// A [`ChartSession`] with the default deterministic text measurer, for
    /// callers that want a chart without assembling options by hand.
    pub struct HeadlessChart {
        session: ChartSession,
    }

    impl HeadlessChart {
        pub fn new(config: ChartConfig) -> Self {
            let session = ChartSession::new(ChartOptions {
                config,
                ..ChartOptions::default()
            });
            Self { session }
        }

        /// Reads records from a CSV file on the next selection or refresh.
        pub fn with_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
            self.set_source(Box::new(CsvFileSource::new(path)));
            self
        }

        pub fn set_source(&mut self, source: Box<dyn RecordSource + Send + Sync>) {
            self.session.set_source(source);
        }

        /// Selects a measure and comparison and rebuilds the scene.
        pub fn select(&mut self, measure: &str, comparison: &str) -> Result<()> {
            self.session.select(measure, comparison)
        }

        /// Rebuilds the scene for the current selection.
        pub fn refresh(&mut self) -> Result<()> {
            self.session.refresh()
        }

        /// Changes the canvas size and rebuilds the scene.
        pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
            self.session.resize(width, height)
        }

        /// Advances the dot simulation one step. Returns `false` once cooled.
        pub fn tick(&mut self) -> bool {
            self.session.tick()
        }

        /// Ticks until the dots cool or `max_ticks` steps have elapsed, and
        /// returns the number of steps taken.
        pub fn settle(&mut self, max_ticks: usize) -> usize {
            let mut steps = 0;
            while steps < max_ticks && self.session.tick() {
                steps += 1;
            }
            steps
        }

        pub fn layout(&self) -> ChartLayout {
            self.session.layout()
        }

        pub fn render_svg(&self) -> String {
            self.session.render_svg()
        }
    }

    impl Default for HeadlessChart {
        fn default() -> Self {
            Self::new(ChartConfig::default())
        }
    }
}
