use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use tracing::debug;

/// Backend used for fitting.
pub type TrainingBackend = Autodiff<NdArray>;

/// Initializes the CPU device.
///
/// This function only exists to be able to change the device at a single location.
pub fn init_device() -> NdArrayDevice {
    debug!("Initializing NdArray CPU device");
    NdArrayDevice::default()
}
