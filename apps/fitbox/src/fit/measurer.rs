//! Capability traits for the rendering substrate.
//!
//! The fit engine never lays text out itself. It asks a [`Measurer`] to
//! build an off-screen probe, re-render it at candidate font sizes and report
//! the resulting box. The instance layer additionally needs a
//! [`StyleMutator`] to read and write the real container's style, and may
//! use a [`Truncator`] to ellipsize text that still overflows at the minimum
//! font size.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Value types
// ────────────────────────────────────────────────────────────────────────────

/// Identity of a container element on the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(Uuid);

impl ContainerId {
    pub fn new() -> Self {
        ContainerId(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered box in CSS pixels.
///
/// Values may carry sub-pixel precision; the engine truncates them before
/// every comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub fn new(width: f64, height: f64) -> Self {
        BoxSize { width, height }
    }
}

/// Content and computed style of a container at the moment a search starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// The container the snapshot was taken from. Lets a measurer clone
    /// style it does not expose through the snapshot itself.
    pub container: ContainerId,
    /// Markup or text the probe replicates.
    pub content: String,
    /// Computed font size in pixels.
    pub font_size: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerSnapshot {
    pub fn size(&self) -> BoxSize {
        BoxSize::new(self.width, self.height)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capabilities
// ────────────────────────────────────────────────────────────────────────────

/// Off-screen probe rendering.
///
/// A probe is an invisible, absolutely positioned copy of the container
/// content, fixed to the container's width with automatic height and hidden
/// overflow. The engine creates exactly one probe per search and always hands
/// it back through [`Measurer::remove_probe`].
pub trait Measurer {
    type Probe;

    fn create_probe(&mut self, snapshot: &ContainerSnapshot) -> Self::Probe;

    fn set_probe_font_size(&mut self, probe: &mut Self::Probe, font_size: f64);

    /// Rendered box of the probe. `width` is the scroll width, so content
    /// wider than the fixed box width shows up as overflow.
    fn measure(&self, probe: &Self::Probe) -> BoxSize;

    fn remove_probe(&mut self, probe: Self::Probe);
}

/// Read/write access to the real container.
pub trait StyleMutator {
    /// `None` when the host no longer knows the container.
    fn snapshot(&self, container: ContainerId) -> Option<ContainerSnapshot>;

    fn set_font_size(&mut self, container: ContainerId, font_size: f64);

    /// `data-*` attributes declared on the container, used as lowest
    /// precedence options.
    fn data_attributes(&self, _container: ContainerId) -> Map<String, Value> {
        Map::new()
    }
}

/// Ellipsis truncation of overflowing text.
pub trait Truncator {
    /// Truncates the container, or the descendants matching `selector`.
    fn truncate(&mut self, container: ContainerId, selector: Option<&str>);
}

/// Capabilities a container host must provide to run a FitBox.
///
/// `truncator` returns `None` when no truncation capability is installed;
/// the instance then warns and skips truncation.
pub trait Host: Measurer + StyleMutator {
    fn truncator(&mut self) -> Option<&mut dyn Truncator> {
        None
    }
}
