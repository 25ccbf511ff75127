//! Errors, logging, and evaluation metrics.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{Error, Result};
pub use metrics::{ConfusionMatrix, EvaluationReport};
