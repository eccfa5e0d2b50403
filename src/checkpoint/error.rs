//! Checkpoint error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while compiling, loading or printing a machine
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading or writing the target file failed
    #[error("Error with file '{path}': {source}")]
    FileOperation {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file is not a compiled FSM, or its content is inconsistent
    #[error("File '{path}' does not contain a valid FSM: {reason}")]
    InvalidFileFormat { path: String, reason: String },

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint data failed validation
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),
}

impl CheckpointError {
    pub(crate) fn file(path: &str, source: io::Error) -> Self {
        Self::FileOperation {
            path: path.to_string(),
            source,
        }
    }
}
