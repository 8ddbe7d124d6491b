//! CLI command implementations.

mod device;
pub mod predict;
pub mod serve;
pub mod train;

pub use device::{TrainingBackend, init_device};
