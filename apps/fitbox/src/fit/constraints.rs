//! Min/max clamping of a search result and the truncation trigger.

use crate::config::FitBoxConfig;
use crate::fit::engine::{FitResult, Px};

/// What applying a search result means for the container's style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedSize {
    /// No usable result (empty container or abandoned search).
    Unchanged,
    /// The clamped size equals the current size; no style mutation.
    Kept { font_size: Px },
    /// The container must switch font size.
    Changed { old_font_size: Px, new_font_size: Px },
}

impl AppliedSize {
    pub fn font_size(&self) -> Option<Px> {
        match self {
            AppliedSize::Unchanged => None,
            AppliedSize::Kept { font_size } => Some(*font_size),
            AppliedSize::Changed { new_font_size, .. } => Some(*new_font_size),
        }
    }
}

/// A size after min/max bounds were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub font_size: Px,
    /// The natural size was below `min_font_size`; text will overflow and
    /// needs truncating.
    pub below_min: bool,
}

/// Applies `max_font_size` first, then `min_font_size`.
pub fn clamp_font_size(font_size: Px, config: &FitBoxConfig) -> Clamped {
    match (config.max_font_size, config.min_font_size) {
        (Some(max), _) if font_size > Px::from(max) => Clamped {
            font_size: Px::from(max),
            below_min: false,
        },
        (_, Some(min)) if font_size < Px::from(min) => Clamped {
            font_size: Px::from(min),
            below_min: true,
        },
        _ => Clamped {
            font_size,
            below_min: false,
        },
    }
}

/// Decides the style change for `result` against the container's current
/// font size. Sets `need_truncate` when the minimum bound kicked in; never
/// clears it.
pub fn apply(
    result: FitResult,
    config: &FitBoxConfig,
    current_font_size: Px,
    need_truncate: &mut bool,
) -> AppliedSize {
    let FitResult::Fit { font_size } = result else {
        return AppliedSize::Unchanged;
    };

    let clamped = clamp_font_size(font_size, config);
    if clamped.below_min {
        *need_truncate = true;
    }

    if clamped.font_size == current_font_size {
        AppliedSize::Kept {
            font_size: clamped.font_size,
        }
    } else {
        AppliedSize::Changed {
            old_font_size: current_font_size,
            new_font_size: clamped.font_size,
        }
    }
}
