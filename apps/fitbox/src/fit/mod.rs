// Best-fit font-size search and the pieces that drive it: the probe
// measurement seam, min/max constraints and debounced resize handling.

pub mod constraints;
pub mod engine;
pub mod measurer;
pub mod resize;

#[cfg(test)]
pub(crate) mod testing;

pub use constraints::AppliedSize;
pub use engine::{FitEngine, FitRequest, FitResult, Px};
pub use measurer::{BoxSize, ContainerId, ContainerSnapshot, Host, Measurer, StyleMutator, Truncator};
pub use resize::ResizeCoordinator;
