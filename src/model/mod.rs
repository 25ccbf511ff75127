//! CNN model architecture.

pub mod cnn;

pub use cnn::{CifarClassifier, CifarClassifierConfig, ConvBlock};
