//! Debounced re-sync on viewport resize.
//!
//! Every resize event cancels the pending quiet-period timer and starts a new
//! one; the callback runs once the viewport has been quiet for the whole
//! delay. The timer runs as a task on a caller-provided `LocalSet`, so the
//! callback may touch single-threaded state.

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::{JoinHandle, LocalSet};

use crate::events::ResizeEvent;

/// Owns the debounce task. Dropping it cancels the task.
#[derive(Debug)]
pub struct ResizeCoordinator {
    task: JoinHandle<()>,
}

impl ResizeCoordinator {
    /// Queues the debounce loop on `tasks`. It starts running once the set
    /// is driven.
    pub fn spawn<F>(
        tasks: &LocalSet,
        delay: Duration,
        mut events: broadcast::Receiver<ResizeEvent>,
        mut on_resize_end: F,
    ) -> Self
    where
        F: FnMut() + 'static,
    {
        let task = tasks.spawn_local(async move {
            loop {
                // Idle until a burst starts.
                match events.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => return,
                }

                loop {
                    tokio::select! {
                        received = events.recv() => match received {
                            Ok(_) | Err(RecvError::Lagged(_)) => continue,
                            Err(RecvError::Closed) => return,
                        },
                        _ = tokio::time::sleep(delay) => {
                            on_resize_end();
                            break;
                        }
                    }
                }
            }
        });
        ResizeCoordinator { task }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ResizeCoordinator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
