//! Normalized identifiers for states and input symbols.
//!
//! Both identifiers are case-insensitive in the command language. They are
//! stored in uppercase so that every comparison elsewhere in the crate is a
//! plain equality check.

use super::error::FsmError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a declared state.
///
/// A state name is one or more ASCII alphanumeric characters, held in
/// uppercase.
///
/// # Example
///
/// ```rust
/// use fsm_designer::core::StateId;
///
/// let q0 = StateId::parse("q0").unwrap();
/// assert_eq!(q0.as_str(), "Q0");
/// assert!(StateId::parse("q-0").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateId(String);

impl StateId {
    /// Validate and normalize a raw state name.
    pub fn parse(raw: &str) -> Result<Self, FsmError> {
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FsmError::InvalidState(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StateId {
    type Error = FsmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StateId> for String {
    fn from(value: StateId) -> Self {
        value.0
    }
}

/// A single input symbol.
///
/// Symbols are exactly one ASCII alphanumeric character, held in uppercase.
/// During execution every character of the input string is read as one
/// symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Symbol(char);

impl Symbol {
    /// Validate and normalize a raw symbol token.
    ///
    /// The token must be exactly one alphanumeric character.
    pub fn parse(raw: &str) -> Result<Self, FsmError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(FsmError::InvalidSymbol(raw.to_string())),
        }
    }

    pub fn from_char(c: char) -> Result<Self, FsmError> {
        if c.is_ascii_alphanumeric() {
            Ok(Self(c.to_ascii_uppercase()))
        } else {
            Err(FsmError::InvalidSymbol(c.to_string()))
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for Symbol {
    type Error = FsmError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl From<Symbol> for char {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
