use crate::color::default_palette;
use serde::{Deserialize, Serialize};

/// Chart tunables. Every field has a default, so hosts configure by
/// deserializing a partial document or by mutating `ChartConfig::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Canvas size in pixels.
    pub width: f64,
    pub height: f64,
    /// Inset kept clear around the canvas edges.
    pub margin: f64,
    /// Radius of one person dot.
    pub mark_radius: f64,
    /// Collision radius of one person dot; the gap over `mark_radius` keeps
    /// dots from touching.
    pub mark_margin: f64,
    /// Ordinal background palette, claimed by measure names in first-seen
    /// order.
    pub palette: Vec<String>,
    /// Seed for every random draw (spread seeding, force jiggle, label
    /// annealing). Same seed and inputs reproduce the layout exactly.
    pub random_seed: u64,
    /// Upper bound on group settle ticks; the force schedule normally rests
    /// around 300.
    pub max_resolve_ticks: usize,
    pub label_font_size: f64,
    /// Greedy wrap width for group labels, in characters.
    pub label_max_chars: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 10.0,
            mark_radius: 5.0,
            mark_margin: 7.0,
            palette: default_palette(),
            random_seed: 0,
            max_resolve_ticks: 500,
            label_font_size: 12.5,
            label_max_chars: 10,
        }
    }
}
