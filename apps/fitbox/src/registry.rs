//! Per-container instance cache and the plugin-style entry point.
//!
//! `fitbox(containers, call)` mirrors the usual element-plugin shape: an
//! options object constructs (or reuses) the instance, a method name
//! dispatches to the existing instance. Each container gets at most one
//! instance; `detach` disposes it and stops its resize listener.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::Value;
use tokio::task::LocalSet;
use tracing::{debug, info};

use crate::config::{parse_int_prefix, FitBoxConfig};
use crate::errors::FitBoxError;
use crate::events::EventBus;
use crate::fit::constraints::AppliedSize;
use crate::fit::engine::Px;
use crate::fit::measurer::{ContainerId, Host};
use crate::fitbox::FitBox;

pub type SharedFitBox<H> = Rc<RefCell<FitBox<H>>>;

// ────────────────────────────────────────────────────────────────────────────
// Plugin call shape
// ────────────────────────────────────────────────────────────────────────────

/// Public instance methods reachable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Sync,
    SetFontSize,
    Truncate,
}

impl FromStr for Method {
    type Err = FitBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Method::Sync),
            "setFontSize" => Ok(Method::SetFontSize),
            "truncate" => Ok(Method::Truncate),
            other => Err(FitBoxError::UnknownMethod(other.to_string())),
        }
    }
}

/// Argument of a plugin call.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginCall {
    /// Construct-or-reuse with these options.
    Options(Value),
    /// Invoke a public method on the instance.
    Method { name: String, argument: Option<Value> },
}

impl PluginCall {
    pub fn method(name: &str) -> Self {
        PluginCall::Method {
            name: name.to_string(),
            argument: None,
        }
    }

    pub fn method_with(name: &str, argument: Value) -> Self {
        PluginCall::Method {
            name: name.to_string(),
            argument: Some(argument),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

pub struct FitBoxRegistry<H: Host + Clone + 'static> {
    host: H,
    events: EventBus,
    tasks: Option<Rc<LocalSet>>,
    instances: HashMap<ContainerId, SharedFitBox<H>>,
}

impl<H: Host + Clone + 'static> FitBoxRegistry<H> {
    pub fn new(host: H, events: EventBus) -> Self {
        FitBoxRegistry {
            host,
            events,
            tasks: None,
            instances: HashMap::new(),
        }
    }

    /// Runs resize timers of instances attached from now on in `tasks`.
    /// Without a task set, `adjustAfterResize` is rejected at attach time.
    pub fn with_task_set(mut self, tasks: Rc<LocalSet>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn get(&self, container: ContainerId) -> Option<SharedFitBox<H>> {
        self.instances.get(&container).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns the existing instance, or builds one from the container's data
    /// attributes overlaid with `options`.
    pub fn attach(
        &mut self,
        container: ContainerId,
        options: Option<&Value>,
    ) -> Result<SharedFitBox<H>, FitBoxError> {
        if let Some(existing) = self.get(container) {
            debug!(%container, "Reusing existing FitBox");
            return Ok(existing);
        }
        let config = FitBoxConfig::from_options(self.host.data_attributes(container), options)?;
        self.attach_with_config(container, config)
    }

    /// Like [`attach`](Self::attach) with an already built config. An
    /// existing instance keeps its original config.
    pub fn attach_with_config(
        &mut self,
        container: ContainerId,
        config: FitBoxConfig,
    ) -> Result<SharedFitBox<H>, FitBoxError> {
        if let Some(existing) = self.get(container) {
            return Ok(existing);
        }
        let instance = FitBox::attach(
            self.host.clone(),
            self.events.clone(),
            self.tasks.as_deref(),
            container,
            config,
        )?;
        self.instances.insert(container, instance.clone());
        info!(%container, "FitBox attached");
        Ok(instance)
    }

    /// Disposes the container's instance. Its resize listener stops once
    /// no other handle to the instance remains.
    pub fn detach(&mut self, container: ContainerId) -> bool {
        let removed = self.instances.remove(&container).is_some();
        if removed {
            info!(%container, "FitBox detached");
        }
        removed
    }

    /// Plugin entry point over a set of containers.
    ///
    /// Returns what each method call applied (`None` for construction-only
    /// calls and for `truncate`). Stops at the first failing container.
    pub fn fitbox(
        &mut self,
        containers: &[ContainerId],
        call: &PluginCall,
    ) -> Result<Vec<Option<AppliedSize>>, FitBoxError> {
        containers
            .iter()
            .map(|container| self.call(*container, call))
            .collect()
    }

    fn call(
        &mut self,
        container: ContainerId,
        call: &PluginCall,
    ) -> Result<Option<AppliedSize>, FitBoxError> {
        match call {
            PluginCall::Options(options) => {
                self.attach(container, Some(options))?;
                Ok(None)
            }
            PluginCall::Method { name, argument } => {
                let method: Method = name.parse()?;
                let instance = self.attach(container, None)?;
                let mut fitbox = instance.borrow_mut();
                match method {
                    Method::Sync => fitbox.sync().map(Some),
                    Method::SetFontSize => {
                        let font_size = argument
                            .as_ref()
                            .and_then(font_size_argument)
                            .ok_or(FitBoxError::MissingArgument("setFontSize"))?;
                        fitbox.set_font_size(font_size).map(Some)
                    }
                    Method::Truncate => {
                        fitbox.truncate();
                        Ok(None)
                    }
                }
            }
        }
    }
}

fn font_size_argument(value: &Value) -> Option<Px> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as Px),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}
