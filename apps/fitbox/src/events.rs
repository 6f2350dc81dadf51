//! Host event bus: viewport resize notifications in, font-size changes out.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::fit::engine::Px;
use crate::fit::measurer::ContainerId;

/// Name of the change notification emitted on the host document.
pub const CHANGE_EVENT: &str = "fitbox:change";

const DEFAULT_CAPACITY: usize = 64;

/// The viewport was resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

/// Payload of a `fitbox:change` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitBoxChange {
    pub container: ContainerId,
    pub old_font_size: Px,
    pub new_font_size: Px,
    pub need_truncate: bool,
}

/// Broadcast channels shared by the host and every FitBox instance.
#[derive(Debug, Clone)]
pub struct EventBus {
    resize: broadcast::Sender<ResizeEvent>,
    change: broadcast::Sender<FitBoxChange>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (resize, _) = broadcast::channel(capacity);
        let (change, _) = broadcast::channel(capacity);
        EventBus { resize, change }
    }

    /// Fires a viewport resize. Returns the number of listeners reached.
    pub fn resize(&self, event: ResizeEvent) -> usize {
        self.resize.send(event).unwrap_or(0)
    }

    pub fn subscribe_resize(&self) -> broadcast::Receiver<ResizeEvent> {
        self.resize.subscribe()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<FitBoxChange> {
        self.change.subscribe()
    }

    pub(crate) fn emit_change(&self, change: FitBoxChange) {
        // No subscribers is fine.
        let _ = self.change.send(change);
    }
}
