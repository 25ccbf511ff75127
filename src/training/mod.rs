//! Training loops and evaluation.

pub mod supervised;

pub use supervised::{run_training, TrainOptions};
