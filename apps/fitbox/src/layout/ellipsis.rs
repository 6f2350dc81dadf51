//! Word-level ellipsis truncation.
//!
//! Trailing words are dropped until the caller's fit check accepts the
//! shortened text with the marker appended. Words are never split.

pub const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ellipsized {
    /// The text already fits.
    Unchanged,
    /// The longest fitting prefix plus the marker.
    Truncated(String),
    /// Not even the bare marker fits.
    Exhausted,
}

/// Shortens `text` word by word until `fits` accepts it.
pub fn ellipsize(text: &str, fits: impl Fn(&str) -> bool) -> Ellipsized {
    if fits(text) {
        return Ellipsized::Unchanged;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    for keep in (0..words.len()).rev() {
        let candidate = if keep == 0 {
            ELLIPSIS.to_string()
        } else {
            format!("{}{ELLIPSIS}", words[..keep].join(" "))
        };
        if fits(&candidate) {
            return Ellipsized::Truncated(candidate);
        }
    }
    Ellipsized::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_most(chars: usize) -> impl Fn(&str) -> bool {
        move |s: &str| s.chars().count() <= chars
    }

    #[test]
    fn test_fitting_text_is_unchanged() {
        assert_eq!(ellipsize("short", at_most(10)), Ellipsized::Unchanged);
    }

    #[test]
    fn test_drops_trailing_words() {
        assert_eq!(
            ellipsize("one two three four", at_most(9)),
            Ellipsized::Truncated("one two…".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_bare_marker() {
        assert_eq!(
            ellipsize("unbreakable", at_most(3)),
            Ellipsized::Truncated("…".to_string())
        );
    }

    #[test]
    fn test_exhausted_when_nothing_fits() {
        assert_eq!(ellipsize("any text", at_most(0)), Ellipsized::Exhausted);
    }
}
