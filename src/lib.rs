//! FSM Designer: build and run deterministic finite-state machines from a
//! small command language.
//!
//! The crate keeps a pure engine apart from the text-facing shell. The
//! engine never performs I/O; the interpreter and checkpoint layers own
//! every file and stream.
//!
//! # Modules
//!
//! - **core**: the `Fsm` engine, identifiers, warnings and traces
//! - **checkpoint**: compiled (binary/JSON) snapshots and script rendering
//! - **interpreter**: statement reading, parsing and the interactive session
//! - **config**: runtime settings from file and environment
//!
//! # Example
//!
//! ```rust
//! use fsm_designer::core::{Fsm, Verdict};
//!
//! let mut fsm = Fsm::new();
//! fsm.add_symbol("0").unwrap();
//! fsm.add_symbol("1").unwrap();
//! fsm.add_state("even").unwrap();
//! fsm.add_state("odd").unwrap();
//! fsm.add_final_state("even").unwrap();
//! fsm.add_transition("1", "even", "odd").unwrap();
//! fsm.add_transition("1", "odd", "even").unwrap();
//! fsm.add_transition("0", "even", "even").unwrap();
//! fsm.add_transition("0", "odd", "odd").unwrap();
//!
//! let trace = fsm.trace("0110");
//! assert_eq!(trace.verdict(), Verdict::Accept);
//! assert_eq!(trace.to_string(), "EVEN EVEN ODD EVEN EVEN YES");
//! ```

pub mod checkpoint;
pub mod config;
pub mod core;
pub mod interpreter;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointError, Format};
pub use self::config::Settings;
pub use self::core::{Fsm, FsmError, StateId, Symbol, Trace, Verdict, Warning};
pub use interpreter::{CommandError, Mode, Session};
