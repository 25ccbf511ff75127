//! Backend selection
//!
//! Training runs on the CPU via the NdArray backend. The whole pipeline is
//! synchronous and single-threaded, so no GPU backend is wired up.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};

/// The default inference backend
pub type DefaultBackend = NdArray<f32>;

/// The default autodiff backend for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Get the default device
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    "NdArray (CPU)"
}
