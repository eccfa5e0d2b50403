//! Engine error types.

use thiserror::Error;

/// Hard failures raised by the FSM engine.
///
/// Recoverable conditions (duplicate declarations, auto-declared states,
/// overridden transitions) are reported as [`Warning`](super::Warning)s
/// instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("Invalid symbol '{0}': a symbol must be a single alphanumeric character")]
    InvalidSymbol(String),

    #[error("Invalid state '{0}': a state must be a non-empty alphanumeric name")]
    InvalidState(String),

    #[error("Invalid transition <{symbol},{from}> -> {to}: {reason}")]
    InvalidTransition {
        symbol: String,
        from: String,
        to: String,
        reason: String,
    },
}
