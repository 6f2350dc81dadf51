//! Best-fit font sizing for fixed-size text containers.
//!
//! A [`FitBox`] searches for the largest whole-pixel font size at which a
//! container's content fits its box, measuring an off-screen probe through
//! the [`Host`] seam. [`layout::Document`] is an in-memory host with
//! metric-table text layout.

pub mod config;
pub mod errors;
pub mod events;
pub mod fit;
pub mod fitbox;
pub mod layout;
pub mod registry;

pub use config::{AppConfig, FitBoxConfig};
pub use errors::FitBoxError;
pub use events::{EventBus, FitBoxChange, ResizeEvent, CHANGE_EVENT};
pub use fit::{AppliedSize, ContainerId, FitEngine, FitRequest, FitResult, Host};
pub use fitbox::FitBox;
pub use registry::{FitBoxRegistry, Method, PluginCall};
