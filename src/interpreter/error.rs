//! Command errors.

use crate::checkpoint::CheckpointError;
use crate::core::FsmError;
use std::io;
use thiserror::Error;

/// Failure of a single statement.
///
/// Every variant is reported as one diagnostic line and the session keeps
/// running.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Unknown keyword, wrong arity or malformed transition triple
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// EXECUTE without a usable input string, or on an uninitialized FSM
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A file named by the command could not be read or written
    #[error("Error with file '{path}': {source}")]
    FileOperation {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fsm(#[from] FsmError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl CommandError {
    pub(crate) fn file(path: &str, source: io::Error) -> Self {
        Self::FileOperation {
            path: path.to_string(),
            source,
        }
    }
}
