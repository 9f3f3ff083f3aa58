//! Resolved scene model. Everything here is plain data so callers can
//! serialize a layout or hand it to the SVG writer unchanged.

use serde::{Deserialize, Serialize};

/// One settled chart frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    /// Hex fill behind the whole canvas, keyed off the selected measure.
    pub background_color: String,
    /// The background hex re-expressed as `rgba(..)` at 0.85 alpha.
    pub content_color: String,
    pub mark_radius: f64,
    pub label_font_size: f64,
    pub groups: Vec<GroupLayout>,
    pub people: Vec<NodeLayout>,
}

/// A packed answer cluster plus its annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub measure: String,
    pub comparison: String,
    /// Percentage of the population, as fed in.
    pub value: f64,
    pub x: f64,
    pub y: f64,
    /// Approximate packed radius for `value` dots.
    pub r: f64,
    /// Wrapped label text, one entry per rendered line.
    pub lines: Vec<String>,
    pub label: LabelLayout,
    pub anchor: AnchorLayout,
    /// Path data for the arc-and-tick leader between anchor and label.
    pub connector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnchorLayout {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// One person dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Stable across updates while the dot survives reconciliation.
    pub id: u64,
    /// Name of the group the dot currently belongs to.
    pub group: String,
    pub x: f64,
    pub y: f64,
}
