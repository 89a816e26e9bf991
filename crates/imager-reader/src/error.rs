//! Error types for the reader crate.

use imager_common::ImagerError;
use thiserror::Error;

/// Errors that can occur while reading a file's bands.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Imager(#[from] ImagerError),

    #[error("Band '{band}' could not be loaded: {source}")]
    Band {
        band: String,
        #[source]
        source: ImagerError,
    },

    #[error("Unrecognised file name: {0}")]
    FileName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ReaderError {
    /// The engine error behind this failure, if any.
    pub fn imager_error(&self) -> Option<&ImagerError> {
        match self {
            ReaderError::Imager(err) | ReaderError::Band { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
