//! Ordinal palette and color helpers.
//!
//! The chart keys its background color on the selected measure name through
//! a d3 `scaleOrdinal`: the first name seen claims the first palette entry,
//! the next new name the second, cycling once the palette is exhausted.
//! Content panels get a translucent variant via [`hex_to_rgba`].

use crate::error::{Error, Result};
use indexmap::IndexSet;

/// The chart's seven-color measure palette.
pub const DEFAULT_PALETTE: [&str; 7] = [
    "#3C6998", "#B05154", "#1B7A7D", "#8D4579", "#97593F", "#605487", "#306C3F",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// d3-style ordinal scale: keys claim palette entries in first-seen order.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    range: Vec<String>,
    domain: IndexSet<String>,
}

impl OrdinalScale {
    pub fn new(range: Vec<String>) -> Self {
        Self {
            range,
            domain: IndexSet::new(),
        }
    }

    /// The color for `key`, registering it in the domain if unseen.
    /// An empty range yields an empty string.
    pub fn color_for(&mut self, key: &str) -> String {
        if self.range.is_empty() {
            return String::new();
        }
        let idx = match self.domain.get_index_of(key) {
            Some(idx) => idx,
            None => {
                self.domain.insert(key.to_string());
                self.domain.len() - 1
            }
        };
        self.range[idx % self.range.len()].clone()
    }
}

impl Default for OrdinalScale {
    fn default() -> Self {
        Self::new(default_palette())
    }
}

/// `#RGB` or `#RRGGBB` to a translucent `rgba(r,g,b,0.85)` string.
/// Anything else is an error; palette entries must be well-formed hex.
pub fn hex_to_rgba(hex: &str) -> Result<String> {
    let bad = || Error::InvalidHexColor {
        color: hex.to_string(),
    };
    let digits = hex.strip_prefix('#').ok_or_else(bad)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let (r, g, b) = match digits.len() {
        3 => (
            u8::from_str_radix(&digits[0..1].repeat(2), 16).map_err(|_| bad())?,
            u8::from_str_radix(&digits[1..2].repeat(2), 16).map_err(|_| bad())?,
            u8::from_str_radix(&digits[2..3].repeat(2), 16).map_err(|_| bad())?,
        ),
        6 => (
            u8::from_str_radix(&digits[0..2], 16).map_err(|_| bad())?,
            u8::from_str_radix(&digits[2..4], 16).map_err(|_| bad())?,
            u8::from_str_radix(&digits[4..6], 16).map_err(|_| bad())?,
        ),
        _ => return Err(bad()),
    };
    Ok(format!("rgba({r},{g},{b},0.85)"))
}
