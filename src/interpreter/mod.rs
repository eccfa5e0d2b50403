//! Command interpreter.
//!
//! Turns text (interactive lines or script files) into engine operations:
//! - [`StatementBuffer`] assembles semicolon-terminated statements
//! - [`lexer`] holds the keyword registry and the statement splitters
//! - [`Command`] validates arity and argument shape
//! - [`Session`] dispatches commands and reports results
//! - [`SessionLog`] mirrors every exchange to a file when enabled

mod command;
mod error;
pub mod lexer;
mod log;
mod session;
mod statement;

pub use command::{Command, TransitionSpec};
pub use error::CommandError;
pub use lexer::Keyword;
pub use log::SessionLog;
pub use session::{Mode, Session};
pub use statement::{ReadEvent, Statement, StatementBuffer};
