use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 12.5,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Headless stand-in for a browser `getBBox()` call. Label placement only
/// needs a box, not glyph-accurate extents.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines = text.split('\n').collect::<Vec<_>>();
        let font_size = style.font_size.max(1.0);
        let mut max_chars = 0usize;
        for line in &lines {
            max_chars = max_chars.max(line.chars().count());
        }

        let width = max_chars as f64 * font_size * char_width_factor;
        let height = lines.len() as f64 * font_size * line_height_factor;
        TextMetrics {
            width,
            height,
            line_count: lines.len(),
        }
    }
}

/// Greedy word wrap. Breaks on spaces so that no line grows past
/// `max_chars`, except that a single word longer than the limit is kept
/// whole on its own line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut first = true;
    for word in text.split(' ') {
        if first {
            first = false;
        } else if line.chars().count() + 1 + word.chars().count() <= max_chars {
            line.push(' ');
        } else {
            lines.push(std::mem::take(&mut line));
        }
        line.push_str(word);
    }
    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("Owned, with a mortgage", 10),
            vec!["Owned,", "with a", "mortgage"]
        );
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Rented", 10), vec!["Rented"]);
    }

    #[test]
    fn a_line_may_fill_the_limit_exactly() {
        assert_eq!(wrap_text("with a", 6), vec!["with a"]);
    }

    #[test]
    fn an_oversized_word_is_kept_whole() {
        assert_eq!(
            wrap_text("a incomprehensibilities b", 10),
            vec!["a", "incomprehensibilities", "b"]
        );
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn measured_height_tracks_the_line_count() {
        let measurer = DeterministicTextMeasurer::default();
        let metrics = measurer.measure("Owned,\nwith a\nmortgage", &TextStyle::default());
        assert_eq!(metrics.line_count, 3);
        assert!((metrics.height - 45.0).abs() < 1e-9);
        assert!((metrics.width - 8.0 * 12.5 * 0.6).abs() < 1e-9);
    }
}
