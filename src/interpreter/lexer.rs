//! Tokenizer and statement splitter for the command language.
//!
//! Keywords are matched case-insensitively against a fixed registry.
//! Arguments are split on whitespace, except for the TRANSITIONS argument
//! list which is split on commas first (see [`split_triples`]).

use std::fmt;

/// Registered command keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Symbols,
    States,
    InitialState,
    FinalStates,
    Transitions,
    Print,
    Compile,
    Load,
    Execute,
    Clear,
    Log,
    Exit,
}

impl Keyword {
    pub const ALL: [Keyword; 12] = [
        Keyword::Symbols,
        Keyword::States,
        Keyword::InitialState,
        Keyword::FinalStates,
        Keyword::Transitions,
        Keyword::Print,
        Keyword::Compile,
        Keyword::Load,
        Keyword::Execute,
        Keyword::Clear,
        Keyword::Log,
        Keyword::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symbols => "SYMBOLS",
            Self::States => "STATES",
            Self::InitialState => "INITIAL-STATE",
            Self::FinalStates => "FINAL-STATES",
            Self::Transitions => "TRANSITIONS",
            Self::Print => "PRINT",
            Self::Compile => "COMPILE",
            Self::Load => "LOAD",
            Self::Execute => "EXECUTE",
            Self::Clear => "CLEAR",
            Self::Log => "LOG",
            Self::Exit => "EXIT",
        }
    }

    /// Look up a token in the registry, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split on runs of whitespace.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split a candidate statement wherever a registered keyword appears
/// beyond the first token.
///
/// Each piece is returned as whitespace-normalized text. A statement with
/// no embedded keyword comes back unchanged as a single piece. The input
/// string of EXECUTE is never read as a keyword, so `EXECUTE clear` stays
/// one piece.
///
/// ```rust
/// use fsm_designer::interpreter::lexer::split_statements;
///
/// assert_eq!(
///     split_statements("STATES q0 q1 initial-state q0"),
///     vec!["STATES q0 q1", "initial-state q0"]
/// );
/// assert_eq!(split_statements("EXECUTE exit"), vec!["EXECUTE exit"]);
/// ```
pub fn split_statements(text: &str) -> Vec<String> {
    let mut pieces: Vec<Vec<&str>> = Vec::new();
    for token in tokenize(text) {
        match pieces.last_mut() {
            Some(piece) if Keyword::from_token(token).is_none() || awaits_input(piece) => {
                piece.push(token)
            }
            _ => pieces.push(vec![token]),
        }
    }
    pieces.into_iter().map(|piece| piece.join(" ")).collect()
}

/// A bare EXECUTE takes the next token as its input string.
fn awaits_input(piece: &[&str]) -> bool {
    matches!(piece, [head] if Keyword::from_token(head) == Some(Keyword::Execute))
}

/// Split the TRANSITIONS argument blob into comma-separated triples.
///
/// Each triple is trimmed; a single dangling comma at the end of the list
/// is tolerated.
pub fn split_triples(args: &str) -> Vec<&str> {
    let mut triples: Vec<&str> = args.split(',').map(str::trim).collect();
    if triples.len() > 1 && triples.last().is_some_and(|t| t.is_empty()) {
        triples.pop();
    }
    triples
}
