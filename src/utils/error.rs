//! Error types for the CIFAR-10 classification pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset download failed
    #[error("Download error: {0}")]
    Download(String),

    /// Archive extraction failed
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Image decoding error
    #[error("Image error for {path:?}: {message}")]
    Image { path: PathBuf, message: String },

    /// Dataset structure or enumeration error
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Download(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Specialized Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Dataset("no samples found".to_string());
        assert_eq!(err.to_string(), "Dataset error: no samples found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
