//! Greedy word wrap at a pixel width.

use crate::layout::font_metrics::FontMetricTable;

/// Result of wrapping a text block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    /// Pixel width of every printed line.
    pub line_widths: Vec<f64>,
}

impl TextLayout {
    pub fn line_count(&self) -> usize {
        self.line_widths.len()
    }

    /// Widest line. A single word wider than the wrap width stays on its own
    /// line, so this exceeds the wrap width when content overflows sideways.
    pub fn widest_line(&self) -> f64 {
        self.line_widths.iter().copied().fold(0.0, f64::max)
    }

    /// Block height for a given line height in pixels.
    pub fn height(&self, line_height_px: f64) -> f64 {
        self.line_count() as f64 * line_height_px
    }
}

/// Wraps `text` at `max_width` pixels. Whitespace-only text lays out to zero
/// lines.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    font_size: f64,
    max_width: f64,
) -> TextLayout {
    let mut line_widths = Vec::new();
    let mut current_width = 0.0_f64;
    let mut first_on_line = true;
    let space_w = metrics.space_px(font_size);

    for word in text.split_whitespace() {
        let word_w = metrics.measure_px(word, font_size);

        if first_on_line {
            current_width = word_w;
            first_on_line = false;
        } else if current_width + space_w + word_w > max_width {
            line_widths.push(current_width);
            current_width = word_w;
        } else {
            current_width += space_w + word_w;
        }
    }
    if !first_on_line {
        line_widths.push(current_width);
    }

    TextLayout { line_widths }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, FontFamily};

    fn mono() -> &'static FontMetricTable {
        get_metrics(FontFamily::Mono)
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let layout = wrap_text("   ", mono(), 10.0, 100.0);
        assert_eq!(layout.line_count(), 0);
        assert_eq!(layout.height(12.0), 0.0);
        assert_eq!(layout.widest_line(), 0.0);
    }

    #[test]
    fn test_short_text_is_one_line() {
        // "ab cd" at 10px mono: 5 cells * 6px = 30px
        let layout = wrap_text("ab cd", mono(), 10.0, 100.0);
        assert_eq!(layout.line_count(), 1);
        assert!((layout.widest_line() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_wraps_at_width() {
        // Each "abcd" is 24px, with a 6px space: two words need 54px.
        let layout = wrap_text("abcd abcd abcd", mono(), 10.0, 50.0);
        assert_eq!(layout.line_count(), 3);

        let layout = wrap_text("abcd abcd abcd", mono(), 10.0, 60.0);
        assert_eq!(layout.line_count(), 2);
    }

    #[test]
    fn test_long_word_overflows_sideways() {
        let layout = wrap_text("abcdefghijkl", mono(), 10.0, 50.0);
        assert_eq!(layout.line_count(), 1);
        assert!(layout.widest_line() > 50.0);
    }
}
