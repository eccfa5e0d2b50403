//! FSM engine.
//!
//! This module contains the machine definition and its execution:
//! - Normalized identifiers (`StateId`, `Symbol`)
//! - The `Fsm` engine with its declaration and transition rules
//! - Execution traces and verdicts
//!
//! Nothing in this module performs I/O. Mutators report hard failures as
//! `FsmError` and recoverable conditions as `Warning`s.

mod error;
mod machine;
mod state;
mod trace;

pub use error::FsmError;
pub use machine::{Fsm, Outcome, TransitionKey, Warning};
pub use state::{StateId, Symbol};
pub use trace::{Halt, Trace, Verdict};
