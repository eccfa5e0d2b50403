//! Execution traces.
//!
//! A trace records every state visited while an input string is consumed,
//! starting with the initial state, together with the accept/reject verdict
//! and the reason execution stopped early (if it did).

use super::state::{StateId, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final decision of an execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    /// Token printed after the visited states.
    pub fn token(self) -> &'static str {
        match self {
            Self::Accept => "YES",
            Self::Reject => "NO",
        }
    }
}

/// Reason an execution stopped before consuming the whole input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// No initial state has been declared.
    NotInitialized,

    /// The input contains a character that is not a declared symbol.
    UndeclaredSymbol(char),

    /// No transition is defined for the symbol from the current state.
    NoTransition { symbol: Symbol, state: StateId },
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => f.write_str("FSM is not initialized: no initial state"),
            Self::UndeclaredSymbol(c) => write!(f, "invalid input symbol '{}'", c),
            Self::NoTransition { symbol, state } => {
                write!(f, "no transition for <{},{}>", symbol, state)
            }
        }
    }
}

/// Ordered record of one execution.
///
/// The trace length is not necessarily `input.len() + 1`: an execution that
/// halts early keeps every state visited up to that point.
///
/// # Example
///
/// ```rust
/// use fsm_designer::core::{Fsm, Verdict};
///
/// let mut fsm = Fsm::new();
/// fsm.add_symbol("a").unwrap();
/// fsm.add_state("q0").unwrap();
/// fsm.add_state("q1").unwrap();
/// fsm.add_final_state("q1").unwrap();
/// fsm.add_transition("a", "q0", "q1").unwrap();
///
/// let trace = fsm.trace("a");
/// assert_eq!(trace.verdict(), Verdict::Accept);
/// assert_eq!(trace.to_string(), "Q0 Q1 YES");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    states: Vec<StateId>,
    verdict: Verdict,
    halt: Option<Halt>,
}

impl Trace {
    pub(crate) fn new(states: Vec<StateId>, verdict: Verdict, halt: Option<Halt>) -> Self {
        Self {
            states,
            verdict,
            halt,
        }
    }

    pub(crate) fn not_initialized() -> Self {
        Self::new(Vec::new(), Verdict::Reject, Some(Halt::NotInitialized))
    }

    /// Visited states, initial state first.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }

    /// Why execution stopped early, if it did.
    pub fn halt(&self) -> Option<&Halt> {
        self.halt.as_ref()
    }

    /// Last state reached.
    pub fn last_state(&self) -> Option<&StateId> {
        self.states.last()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in &self.states {
            write!(f, "{} ", state)?;
        }
        f.write_str(self.verdict.token())
    }
}
