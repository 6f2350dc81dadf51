//! Static font-metric tables for the reference document.
//!
//! Character widths are in em units (relative to font size). This is an
//! approximation of real glyph metrics, good enough to drive the fit search
//! deterministically without a font rasterizer.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Font families the reference document can lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Humanist sans-serif.
    #[default]
    Sans,
    /// Condensed display sans-serif, roughly 68% of `Sans`.
    Condensed,
    /// Fixed pitch: every character is 0.6em.
    Mono,
}

#[derive(Debug, Error)]
#[error("Unknown font family: {0}")]
pub struct ParseFontFamilyError(String);

impl FromStr for FontFamily {
    type Err = ParseFontFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans" | "sans-serif" | "inter" => Ok(FontFamily::Sans),
            "condensed" | "oswald" => Ok(FontFamily::Condensed),
            "mono" | "monospace" => Ok(FontFamily::Mono),
            other => Err(ParseFontFamilyError(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em.
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a string in em units. Non-ASCII characters fall back to
    /// `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of a string in pixels at `font_size`.
    pub fn measure_px(&self, s: &str, font_size: f64) -> f64 {
        f64::from(self.measure_str(s)) * font_size
    }

    pub fn space_px(&self, font_size: f64) -> f64 {
        f64::from(self.space_width) * font_size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static SANS_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Sans,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
};

static CONDENSED_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Condensed,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.17, 0.20, 0.26, 0.38, 0.38, 0.61, 0.46, 0.15, 0.23, 0.23, 0.27, 0.40, 0.19, 0.23, 0.19, 0.21,
        // 0     1     2     3     4     5     6     7     8     9
        0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38,
        // :     ;     <     =     >     ?     @
        0.19, 0.19, 0.40, 0.40, 0.40, 0.34, 0.69,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.46, 0.41, 0.41, 0.46, 0.38, 0.34, 0.46, 0.46, 0.17, 0.27, 0.41, 0.36, 0.53,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.46, 0.49, 0.38, 0.49, 0.41, 0.34, 0.38, 0.46, 0.46, 0.61, 0.41, 0.41, 0.38,
        // [     \     ]     ^     _     `
        0.19, 0.21, 0.19, 0.32, 0.38, 0.23,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.38, 0.38, 0.34, 0.38, 0.38, 0.21, 0.38, 0.38, 0.15, 0.15, 0.36, 0.15, 0.56,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.38, 0.38, 0.38, 0.38, 0.23, 0.30, 0.27, 0.38, 0.34, 0.49, 0.34, 0.34, 0.30,
        // {     |     }     ~
        0.23, 0.18, 0.23, 0.40,
    ],
    average_char_width: 0.35,
    space_width: 0.17,
};

static MONO_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Mono,
    widths: [0.6; 95],
    average_char_width: 0.6,
    space_width: 0.6,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Sans => &SANS_TABLE,
        FontFamily::Condensed => &CONDENSED_TABLE,
        FontFamily::Mono => &MONO_TABLE,
    }
}
