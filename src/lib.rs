//! # CIFAR-10 Image Classification
//!
//! A Rust training pipeline for the CIFAR-10 images dataset using the Burn
//! framework.
//!
//! The pipeline downloads the dataset archive, enumerates labeled samples
//! from the extracted directory tree (one subdirectory per class), splits
//! them into train/test by path, trains a small CNN, and reports the macro
//! accuracy on the test split.
//!
//! ## Modules
//!
//! - `dataset`: Archive download, sample enumeration, splitting, and batching
//! - `model`: CNN architecture built with Burn
//! - `training`: The supervised training loop and evaluation
//! - `utils`: Errors, logging, and metrics
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cifar_classifier::backend::TrainingBackend;
//! use cifar_classifier::dataset::download::ensure_dataset;
//! use cifar_classifier::training::supervised::{run_training, TrainOptions};
//!
//! let options = TrainOptions::default();
//! ensure_dataset(&options.data_dir)?;
//! let accuracy = run_training::<TrainingBackend>(&options)?;
//! ```

pub mod backend;
pub mod dataset;
pub mod model;
pub mod training;
pub mod utils;

pub use dataset::batcher::{CifarBatch, CifarBatcher, CifarDataset, CifarItem};
pub use dataset::loader::{ClassVocabulary, DatasetStats, Sample, SplitSamples};
pub use model::cnn::{CifarClassifier, CifarClassifierConfig};
pub use training::supervised::TrainOptions;
pub use utils::error::{Error, Result};
pub use utils::metrics::{ConfusionMatrix, EvaluationReport};

/// Number of CIFAR-10 classes
pub const NUM_CLASSES: usize = 10;

/// CIFAR-10 images are 32x32 RGB
pub const IMAGE_SIZE: usize = 32;

/// CIFAR-10 class names, in label order
pub const CLASS_NAMES: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// Get the class name for a given label index
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASS_NAMES.get(label).copied()
}

/// Get the label index for a given class name
pub fn class_index(name: &str) -> Option<usize> {
    CLASS_NAMES.iter().position(|&n| n == name)
}

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
