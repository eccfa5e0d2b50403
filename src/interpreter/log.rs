//! Session log: mirrors commands and their responses to a text file.
//!
//! At most one log is active at a time. Each exchange is written as two
//! lines: `> <statement>;` followed by the response or error text.

use super::error::CommandError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{info, warn};

#[derive(Debug)]
struct ActiveLog {
    path: String,
    writer: BufWriter<File>,
}

/// Handle to the optional session log file.
#[derive(Debug, Default)]
pub struct SessionLog {
    active: Option<ActiveLog>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Path of the active log file, if any.
    pub fn path(&self) -> Option<&str> {
        self.active.as_ref().map(|log| log.path.as_str())
    }

    /// Start logging to `path`, truncating it.
    ///
    /// An already active log is closed first.
    pub fn start(&mut self, path: &str) -> Result<String, CommandError> {
        if self.is_active() {
            self.stop();
        }
        let file = File::create(path).map_err(|e| CommandError::file(path, e))?;
        self.active = Some(ActiveLog {
            path: path.to_string(),
            writer: BufWriter::new(file),
        });
        info!(path, "session logging started");
        Ok(format!("Started logging to {}", path))
    }

    /// Stop logging and close the file.
    pub fn stop(&mut self) -> String {
        match self.active.take() {
            Some(mut log) => {
                if let Err(e) = log.writer.flush() {
                    warn!(path = %log.path, error = %e, "failed to flush session log");
                    return format!("Error while closing log file: {}", e);
                }
                info!(path = %log.path, "session logging stopped");
                "STOPPED LOGGING".to_string()
            }
            None => "LOGGING was not enabled".to_string(),
        }
    }

    /// Append one exchange. Does nothing when logging is off.
    pub fn record(&mut self, statement: &str, response: &str) -> io::Result<()> {
        let Some(log) = self.active.as_mut() else {
            return Ok(());
        };
        writeln!(log.writer, "> {}", statement)?;
        writeln!(log.writer, "{}", response)?;
        log.writer.flush()
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if self.is_active() {
            self.stop();
        }
    }
}
