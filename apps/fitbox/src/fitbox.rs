//! One FitBox instance per container.
//!
//! An instance runs the full pipeline on construction and on every `sync()`:
//! search for the best size, clamp it to the configured bounds, write it to
//! the container, announce the change and ellipsize when the minimum size
//! still overflows. With `adjust_after_resize` it also re-syncs once the
//! viewport stops resizing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use crate::config::FitBoxConfig;
use crate::errors::FitBoxError;
use crate::events::{EventBus, FitBoxChange};
use crate::fit::constraints::{self, AppliedSize};
use crate::fit::engine::{truncate_px, FitEngine, FitRequest, FitResult, Px};
use crate::fit::measurer::{ContainerId, Host};
use crate::fit::resize::ResizeCoordinator;

pub struct FitBox<H: Host> {
    container: ContainerId,
    config: FitBoxConfig,
    host: H,
    events: EventBus,
    engine: FitEngine,
    need_truncate: bool,
    resize: Option<ResizeCoordinator>,
}

impl<H: Host + 'static> FitBox<H> {
    /// Creates the instance for `container` and applies the best fit.
    ///
    /// With `adjust_after_resize` the debounce task is queued on `tasks`;
    /// without a task set that option is rejected.
    pub fn attach(
        host: H,
        events: EventBus,
        tasks: Option<&LocalSet>,
        container: ContainerId,
        config: FitBoxConfig,
    ) -> Result<Rc<RefCell<Self>>, FitBoxError> {
        if host.snapshot(container).is_none() {
            return Err(FitBoxError::ContainerNotFound(container));
        }
        let tasks = match (config.adjust_after_resize, tasks) {
            (true, None) => return Err(FitBoxError::NoTaskSet),
            (true, Some(tasks)) => Some(tasks),
            (false, _) => None,
        };

        let instance = Rc::new_cyclic(|weak: &Weak<RefCell<Self>>| {
            let resize = tasks.map(|tasks| {
                let weak = weak.clone();
                ResizeCoordinator::spawn(
                    tasks,
                    Duration::from_millis(config.resize_delay_ms),
                    events.subscribe_resize(),
                    move || resync_after_resize(&weak),
                )
            });

            RefCell::new(FitBox {
                container,
                engine: FitEngine::new(config.debug),
                config,
                host,
                events,
                need_truncate: false,
                resize,
            })
        });

        instance.borrow_mut().sync()?;
        Ok(instance)
    }
}

impl<H: Host> FitBox<H> {
    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn config(&self) -> &FitBoxConfig {
        &self.config
    }

    pub fn need_truncate(&self) -> bool {
        self.need_truncate
    }

    pub fn watches_resize(&self) -> bool {
        self.resize.is_some()
    }

    /// Finds the best font size and applies it.
    pub fn sync(&mut self) -> Result<AppliedSize, FitBoxError> {
        let snapshot = self
            .host
            .snapshot(self.container)
            .ok_or(FitBoxError::ContainerNotFound(self.container))?;
        let current = truncate_px(snapshot.font_size);
        let request = FitRequest::new(snapshot)
            .with_max_iterations(self.config.max_try_amount)
            .with_width_aware(self.config.width_aware);

        let result = self.engine.find_best_font_size(&mut self.host, &request);
        if self.config.debug {
            debug!(container = %self.container, ?result, "sync() search finished");
        }
        Ok(self.apply(result, current))
    }

    /// Applies `font_size` within the configured bounds.
    pub fn set_font_size(&mut self, font_size: Px) -> Result<AppliedSize, FitBoxError> {
        let snapshot = self
            .host
            .snapshot(self.container)
            .ok_or(FitBoxError::ContainerNotFound(self.container))?;
        let current = truncate_px(snapshot.font_size);
        Ok(self.apply(FitResult::Fit { font_size }, current))
    }

    /// Ellipsizes the container (or the configured selector within it).
    pub fn truncate(&mut self) {
        if self.config.debug {
            debug!(container = %self.container, "truncate() is executed");
        }
        let selector = self.config.ellipsis_selector.as_deref();
        match self.host.truncator() {
            Some(truncator) => truncator.truncate(self.container, selector),
            None => warn!(
                container = %self.container,
                "You need to install an ellipsis truncation capability"
            ),
        }
    }

    fn apply(&mut self, result: FitResult, current: Px) -> AppliedSize {
        let applied = constraints::apply(result, &self.config, current, &mut self.need_truncate);

        if let AppliedSize::Changed {
            old_font_size,
            new_font_size,
        } = applied
        {
            self.host.set_font_size(self.container, new_font_size as f64);
            if self.config.debug {
                info!(
                    container = %self.container,
                    old_font_size,
                    new_font_size,
                    need_truncate = self.need_truncate,
                    "Font size changed"
                );
            }
            self.events.emit_change(FitBoxChange {
                container: self.container,
                old_font_size,
                new_font_size,
                need_truncate: self.need_truncate,
            });
        }

        // Truncation may still be pending from an earlier cycle.
        if self.need_truncate {
            self.truncate();
        }
        applied
    }
}

fn resync_after_resize<H: Host>(weak: &Weak<RefCell<FitBox<H>>>) {
    let Some(instance) = weak.upgrade() else {
        return;
    };
    let Ok(mut fitbox) = instance.try_borrow_mut() else {
        debug!("FitBox busy; skipping resize re-sync");
        return;
    };
    if let Err(err) = fitbox.sync() {
        warn!(%err, "Re-sync after resize failed");
    }
}
