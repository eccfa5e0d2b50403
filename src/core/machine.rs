//! The deterministic finite-state machine engine.
//!
//! [`Fsm`] owns the machine definition and performs mutation, validation and
//! execution. Mutators never panic and never print: hard failures come back
//! as [`FsmError`], recoverable conditions as [`Warning`]s inside an
//! [`Outcome`], and the caller decides how to report them.

use super::error::FsmError;
use super::state::{StateId, Symbol};
use super::trace::{Halt, Trace, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key of the transition function: the state being left and the symbol read.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    pub from: StateId,
    pub symbol: Symbol,
}

/// Recoverable condition reported by a mutator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    SymbolAlreadyDeclared(Symbol),
    StateAlreadyDeclared(StateId),
    /// A state referenced by INITIAL-STATE or FINAL-STATES was declared on the fly.
    StateAutoDeclared(StateId),
    AlreadyFinal(StateId),
    TransitionOverridden {
        symbol: Symbol,
        from: StateId,
        previous: StateId,
        next: StateId,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SymbolAlreadyDeclared(s) => write!(f, "Warning: symbol {} already declared", s),
            Self::StateAlreadyDeclared(s) => write!(f, "Warning: state {} already declared", s),
            Self::StateAutoDeclared(s) => {
                write!(f, "Warning: {} was not previously declared as a state", s)
            }
            Self::AlreadyFinal(s) => write!(f, "Warning: {} was already a final state", s),
            Self::TransitionOverridden {
                symbol,
                from,
                previous,
                next,
            } => write!(
                f,
                "Warning: transition <{},{}> overridden ({} -> {})",
                symbol, from, previous, next
            ),
        }
    }
}

/// Result of a successful (non-failing) mutation.
///
/// `applied` is false when the call was a no-op, e.g. a duplicate
/// declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub applied: bool,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    fn applied() -> Self {
        Self {
            applied: true,
            warnings: Vec::new(),
        }
    }

    fn unchanged(warning: Warning) -> Self {
        Self {
            applied: false,
            warnings: vec![warning],
        }
    }

    fn warn(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Fold another outcome into this one.
    pub fn merge(mut self, other: Outcome) -> Self {
        self.applied |= other.applied;
        self.warnings.extend(other.warnings);
        self
    }
}

/// Deterministic finite-state machine.
///
/// States keep their declaration order. The first state ever declared
/// becomes both the initial and the current state.
///
/// # Example
///
/// ```rust
/// use fsm_designer::core::Fsm;
///
/// let mut fsm = Fsm::new();
/// fsm.add_symbol("0").unwrap();
/// fsm.add_state("even").unwrap();
/// fsm.add_state("odd").unwrap();
///
/// // Transitions must reference declared symbols and states.
/// assert!(fsm.add_transition("1", "even", "odd").is_err());
/// assert!(fsm.add_transition("0", "even", "even").unwrap().applied);
///
/// // Final states are auto-declared when missing.
/// let outcome = fsm.add_final_state("done").unwrap();
/// assert_eq!(outcome.warnings.len(), 1);
/// assert_eq!(fsm.states().len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fsm {
    symbols: BTreeSet<Symbol>,
    states: Vec<StateId>,
    final_states: BTreeSet<StateId>,
    initial_state: Option<StateId>,
    current_state: Option<StateId>,
    transitions: BTreeMap<TransitionKey, StateId>,
}

impl Fsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Declared states in declaration order.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn final_states(&self) -> impl Iterator<Item = &StateId> {
        self.final_states.iter()
    }

    pub fn initial_state(&self) -> Option<&StateId> {
        self.initial_state.as_ref()
    }

    pub fn current_state(&self) -> Option<&StateId> {
        self.current_state.as_ref()
    }

    /// Transitions ordered by source state, then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&TransitionKey, &StateId)> {
        self.transitions.iter()
    }

    pub fn transition(&self, symbol: Symbol, from: &StateId) -> Option<&StateId> {
        self.transitions.get(&TransitionKey {
            from: from.clone(),
            symbol,
        })
    }

    pub fn has_symbol(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn has_state(&self, state: &StateId) -> bool {
        self.states.contains(state)
    }

    pub fn is_final(&self, state: &StateId) -> bool {
        self.final_states.contains(state)
    }

    /// True when nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.states.is_empty() && self.transitions.is_empty()
    }

    pub fn add_symbol(&mut self, raw: &str) -> Result<Outcome, FsmError> {
        let symbol = Symbol::parse(raw)?;
        if self.symbols.insert(symbol) {
            Ok(Outcome::applied())
        } else {
            Ok(Outcome::unchanged(Warning::SymbolAlreadyDeclared(symbol)))
        }
    }

    pub fn add_state(&mut self, raw: &str) -> Result<Outcome, FsmError> {
        let state = StateId::parse(raw)?;
        if self.has_state(&state) {
            return Ok(Outcome::unchanged(Warning::StateAlreadyDeclared(state)));
        }
        self.declare(state);
        Ok(Outcome::applied())
    }

    /// Set the initial (and current) state, declaring it if needed.
    pub fn set_initial_state(&mut self, raw: &str) -> Result<Outcome, FsmError> {
        let (state, outcome) = self.ensure_declared(raw)?;
        self.initial_state = Some(state.clone());
        self.current_state = Some(state);
        Ok(outcome)
    }

    /// Set the current state only, declaring it if needed.
    pub fn set_current_state(&mut self, raw: &str) -> Result<Outcome, FsmError> {
        let (state, outcome) = self.ensure_declared(raw)?;
        self.current_state = Some(state);
        Ok(outcome)
    }

    pub fn add_final_state(&mut self, raw: &str) -> Result<Outcome, FsmError> {
        let (state, outcome) = self.ensure_declared(raw)?;
        if self.final_states.insert(state.clone()) {
            Ok(outcome)
        } else {
            Ok(Outcome {
                applied: false,
                ..outcome.warn(Warning::AlreadyFinal(state))
            })
        }
    }

    /// Add or overwrite the transition `(symbol, from) -> to`.
    ///
    /// Unlike INITIAL-STATE and FINAL-STATES, every referenced name must
    /// already be declared.
    pub fn add_transition(&mut self, symbol: &str, from: &str, to: &str) -> Result<Outcome, FsmError> {
        let reject = |reason: String| FsmError::InvalidTransition {
            symbol: symbol.to_ascii_uppercase(),
            from: from.to_ascii_uppercase(),
            to: to.to_ascii_uppercase(),
            reason,
        };

        let sym = Symbol::parse(symbol).map_err(|e| reject(e.to_string()))?;
        let from_state = StateId::parse(from).map_err(|e| reject(e.to_string()))?;
        let to_state = StateId::parse(to).map_err(|e| reject(e.to_string()))?;

        if !self.has_symbol(sym) {
            return Err(reject(format!("symbol {} is not declared", sym)));
        }
        if !self.has_state(&from_state) {
            return Err(reject(format!("state {} is not declared", from_state)));
        }
        if !self.has_state(&to_state) {
            return Err(reject(format!("state {} is not declared", to_state)));
        }

        let key = TransitionKey {
            from: from_state.clone(),
            symbol: sym,
        };
        let outcome = match self.transitions.insert(key, to_state.clone()) {
            Some(previous) if previous != to_state => {
                Outcome::applied().warn(Warning::TransitionOverridden {
                    symbol: sym,
                    from: from_state,
                    previous,
                    next: to_state,
                })
            }
            _ => Outcome::applied(),
        };
        Ok(outcome)
    }

    /// Run `input` from the initial state without touching the machine.
    ///
    /// Each character is one symbol. Execution halts at the first
    /// undeclared symbol or missing transition; the verdict is decided by
    /// whether the last state reached is final.
    pub fn trace(&self, input: &str) -> Trace {
        let Some(initial) = self.initial_state.clone() else {
            return Trace::not_initialized();
        };

        let mut current = initial;
        let mut visited = vec![current.clone()];
        let mut halt = None;

        for c in input.chars() {
            let symbol = match Symbol::from_char(c) {
                Ok(symbol) if self.has_symbol(symbol) => symbol,
                _ => {
                    halt = Some(Halt::UndeclaredSymbol(c.to_ascii_uppercase()));
                    break;
                }
            };
            match self.transition(symbol, &current) {
                Some(next) => {
                    current = next.clone();
                    visited.push(current.clone());
                }
                None => {
                    halt = Some(Halt::NoTransition {
                        symbol,
                        state: current.clone(),
                    });
                    break;
                }
            }
        }

        let verdict = if self.is_final(&current) {
            Verdict::Accept
        } else {
            Verdict::Reject
        };
        Trace::new(visited, verdict, halt)
    }

    /// Run `input` and leave the current state where execution stopped.
    pub fn execute(&mut self, input: &str) -> Trace {
        let trace = self.trace(input);
        if let Some(last) = trace.last_state() {
            self.current_state = Some(last.clone());
        }
        trace
    }

    /// Reset to the just-constructed, empty machine.
    pub fn clear(&mut self) {
        self.symbols.clear();
        self.states.clear();
        self.final_states.clear();
        self.transitions.clear();
        self.initial_state = None;
        self.current_state = None;
    }

    fn declare(&mut self, state: StateId) {
        if self.initial_state.is_none() {
            self.initial_state = Some(state.clone());
            self.current_state = Some(state.clone());
        }
        self.states.push(state);
    }

    fn ensure_declared(&mut self, raw: &str) -> Result<(StateId, Outcome), FsmError> {
        let state = StateId::parse(raw)?;
        if self.has_state(&state) {
            return Ok((state, Outcome::applied()));
        }
        self.declare(state.clone());
        let outcome = Outcome::applied().warn(Warning::StateAutoDeclared(state.clone()));
        Ok((state, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> StateId {
        StateId::parse(name).unwrap()
    }

    /// Symbols 0-3, states Q0-Q2, Q2 final; "1" cycles Q0 -> Q1 -> Q2 -> Q0,
    /// "0" and "3" loop, "2" swaps Q0 and Q1 and fixes Q2.
    fn cyclic_machine() -> Fsm {
        let mut fsm = Fsm::new();
        for s in ["0", "1", "2", "3"] {
            fsm.add_symbol(s).unwrap();
        }
        for q in ["q0", "q1", "q2"] {
            fsm.add_state(q).unwrap();
        }
        fsm.set_initial_state("q0").unwrap();
        fsm.add_final_state("q2").unwrap();
        for (s, from, to) in [
            ("1", "q0", "q1"),
            ("1", "q1", "q2"),
            ("1", "q2", "q0"),
            ("2", "q0", "q1"),
            ("2", "q1", "q0"),
            ("2", "q2", "q2"),
        ] {
            fsm.add_transition(s, from, to).unwrap();
        }
        for s in ["0", "3"] {
            for q in ["q0", "q1", "q2"] {
                fsm.add_transition(s, q, q).unwrap();
            }
        }
        fsm
    }

    #[test]
    fn new_machine_is_empty() {
        let fsm = Fsm::new();
        assert!(fsm.is_empty());
        assert!(fsm.initial_state().is_none());
        assert!(fsm.current_state().is_none());
    }

    #[test]
    fn duplicate_symbol_is_a_warning() {
        let mut fsm = Fsm::new();
        assert!(fsm.add_symbol("a").unwrap().applied);

        let outcome = fsm.add_symbol("A").unwrap();
        assert!(!outcome.applied);
        assert_eq!(
            outcome.warnings,
            vec![Warning::SymbolAlreadyDeclared(Symbol::parse("a").unwrap())]
        );
    }

    #[test]
    fn malformed_symbol_is_an_error() {
        let mut fsm = Fsm::new();
        assert!(matches!(fsm.add_symbol("ab"), Err(FsmError::InvalidSymbol(_))));
        assert!(matches!(fsm.add_symbol("?"), Err(FsmError::InvalidSymbol(_))));
    }

    #[test]
    fn first_state_becomes_initial_and_current() {
        let mut fsm = Fsm::new();
        fsm.add_state("b").unwrap();
        fsm.add_state("a").unwrap();
        assert_eq!(fsm.initial_state(), Some(&id("B")));
        assert_eq!(fsm.current_state(), Some(&id("B")));
        assert_eq!(fsm.states(), &[id("B"), id("A")]);
    }

    #[test]
    fn duplicate_state_is_a_warning() {
        let mut fsm = Fsm::new();
        fsm.add_state("q0").unwrap();
        let outcome = fsm.add_state("Q0").unwrap();
        assert!(!outcome.applied);
        assert_eq!(outcome.warnings, vec![Warning::StateAlreadyDeclared(id("Q0"))]);
        assert_eq!(fsm.states().len(), 1);
    }

    #[test]
    fn initial_state_auto_declares() {
        let mut fsm = Fsm::new();
        fsm.add_state("a").unwrap();
        let outcome = fsm.set_initial_state("z").unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.warnings, vec![Warning::StateAutoDeclared(id("Z"))]);
        assert_eq!(fsm.initial_state(), Some(&id("Z")));
        assert_eq!(fsm.current_state(), Some(&id("Z")));
        assert!(fsm.has_state(&id("Z")));
    }

    #[test]
    fn current_state_can_differ_from_initial() {
        let mut fsm = Fsm::new();
        fsm.add_state("a").unwrap();
        fsm.add_state("b").unwrap();
        fsm.set_current_state("b").unwrap();
        assert_eq!(fsm.initial_state(), Some(&id("A")));
        assert_eq!(fsm.current_state(), Some(&id("B")));
    }

    #[test]
    fn final_state_auto_declares_and_warns_on_repeat() {
        let mut fsm = Fsm::new();
        let first = fsm.add_final_state("f").unwrap();
        assert!(first.applied);
        assert_eq!(first.warnings, vec![Warning::StateAutoDeclared(id("F"))]);
        assert!(fsm.has_state(&id("F")));
        assert!(fsm.is_final(&id("F")));

        let second = fsm.add_final_state("F").unwrap();
        assert!(!second.applied);
        assert_eq!(second.warnings, vec![Warning::AlreadyFinal(id("F"))]);
    }

    #[test]
    fn transition_requires_declared_names() {
        let mut fsm = Fsm::new();
        fsm.add_symbol("a").unwrap();
        fsm.add_state("p").unwrap();

        assert!(matches!(
            fsm.add_transition("b", "p", "p"),
            Err(FsmError::InvalidTransition { .. })
        ));
        assert!(matches!(
            fsm.add_transition("a", "x", "p"),
            Err(FsmError::InvalidTransition { .. })
        ));
        assert!(matches!(
            fsm.add_transition("a", "p", "x"),
            Err(FsmError::InvalidTransition { .. })
        ));
        assert_eq!(fsm.transitions().count(), 0);
    }

    #[test]
    fn transition_override_warns_with_both_destinations() {
        let mut fsm = Fsm::new();
        fsm.add_symbol("a").unwrap();
        fsm.add_state("p").unwrap();
        fsm.add_state("q").unwrap();
        fsm.add_transition("a", "p", "p").unwrap();

        let same = fsm.add_transition("A", "P", "P").unwrap();
        assert!(same.warnings.is_empty());

        let outcome = fsm.add_transition("a", "p", "q").unwrap();
        assert!(outcome.applied);
        assert_eq!(
            outcome.warnings,
            vec![Warning::TransitionOverridden {
                symbol: Symbol::parse("a").unwrap(),
                from: id("p"),
                previous: id("p"),
                next: id("q"),
            }]
        );
        assert_eq!(fsm.transition(Symbol::parse("a").unwrap(), &id("p")), Some(&id("q")));
    }

    #[test]
    fn trace_without_initial_state_is_empty() {
        let fsm = Fsm::new();
        let trace = fsm.trace("101");
        assert!(trace.states().is_empty());
        assert_eq!(trace.halt(), Some(&Halt::NotInitialized));
        assert_eq!(trace.verdict(), Verdict::Reject);
    }

    #[test]
    fn cyclic_machine_accepts_when_ending_in_final() {
        let fsm = cyclic_machine();
        let trace = fsm.trace("123");
        // 1: Q0 -> Q1, 2: Q1 -> Q0, 3: Q0 -> Q0
        assert_eq!(trace.states(), &[id("Q0"), id("Q1"), id("Q0"), id("Q0")]);
        assert_eq!(trace.verdict(), Verdict::Reject);
        assert!(trace.halt().is_none());

        let trace = fsm.trace("11");
        assert_eq!(trace.states(), &[id("Q0"), id("Q1"), id("Q2")]);
        assert!(trace.is_accepted());
    }

    #[test]
    fn missing_transition_halts_early() {
        let mut fsm = cyclic_machine();
        fsm.add_symbol("4").unwrap();
        let trace = fsm.trace("1141");
        assert_eq!(trace.states(), &[id("Q0"), id("Q1"), id("Q2")]);
        assert_eq!(
            trace.halt(),
            Some(&Halt::NoTransition {
                symbol: Symbol::parse("4").unwrap(),
                state: id("Q2"),
            })
        );
        // Decided on the state reached before the halt.
        assert!(trace.is_accepted());
    }

    #[test]
    fn undeclared_symbol_halts_early() {
        let fsm = cyclic_machine();
        let trace = fsm.trace("1x1");
        assert_eq!(trace.states(), &[id("Q0"), id("Q1")]);
        assert_eq!(trace.halt(), Some(&Halt::UndeclaredSymbol('X')));
        assert!(!trace.is_accepted());
    }

    #[test]
    fn input_is_case_insensitive() {
        let mut fsm = Fsm::new();
        fsm.add_symbol("A").unwrap();
        fsm.add_state("s").unwrap();
        fsm.add_final_state("s").unwrap();
        fsm.add_transition("a", "s", "s").unwrap();
        assert!(fsm.trace("aAa").is_accepted());
    }

    #[test]
    fn execute_moves_current_state() {
        let mut fsm = cyclic_machine();
        let trace = fsm.execute("11");
        assert!(trace.is_accepted());
        assert_eq!(fsm.current_state(), Some(&id("Q2")));
        assert_eq!(fsm.initial_state(), Some(&id("Q0")));
    }

    #[test]
    fn clear_resets_everything() {
        let mut fsm = cyclic_machine();
        fsm.clear();
        assert_eq!(fsm, Fsm::new());
        assert_eq!(fsm.symbols().count(), 0);
        assert_eq!(fsm.final_states().count(), 0);
        assert_eq!(fsm.trace("1").halt(), Some(&Halt::NotInitialized));
    }
}
