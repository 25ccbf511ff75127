//! Dataset acquisition and handling.
//!
//! The CIFAR-10 images dataset is distributed as a zip archive containing a
//! `train/` and a `test/` tree, one subdirectory per class:
//!
//! ```text
//! CIFAR-10-images-master/
//! ├── train/
//! │   ├── airplane/
//! │   │   ├── 0000.jpg
//! │   │   └── ...
//! │   └── ...
//! └── test/
//!     ├── airplane/
//!     └── ...
//! ```
//!
//! - `download`: archive download and extraction into the cache directory
//! - `loader`: sample enumeration, labeling, shuffling, and splitting
//! - `batcher`: Burn `Dataset` and `Batcher` implementations

pub mod batcher;
pub mod download;
pub mod loader;

pub use batcher::{CifarBatch, CifarBatcher, CifarDataset, CifarItem};
pub use download::{default_data_dir, ensure_dataset, needs_download, CIFAR10_URL};
pub use loader::{ClassVocabulary, DatasetStats, Sample, SplitSamples};
