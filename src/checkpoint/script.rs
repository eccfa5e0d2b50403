//! Render a machine as a command-language script.
//!
//! The output is what PRINT shows and writes, and it can be read back with
//! LOAD to rebuild the same definition.

use super::error::CheckpointError;
use crate::core::Fsm;
use std::fmt::Write as _;
use std::fs;

/// Render `fsm` as semicolon-terminated statements, one per line.
///
/// Empty sections are omitted, so an empty machine renders as an empty
/// string.
///
/// # Example
///
/// ```rust
/// use fsm_designer::checkpoint::script::render_script;
/// use fsm_designer::core::Fsm;
///
/// let mut fsm = Fsm::new();
/// fsm.add_symbol("a").unwrap();
/// fsm.add_state("s").unwrap();
/// fsm.add_transition("a", "s", "s").unwrap();
///
/// assert_eq!(
///     render_script(&fsm),
///     "SYMBOLS A;\nSTATES S;\nINITIAL-STATE S;\nTRANSITIONS A S S;\n"
/// );
/// ```
pub fn render_script(fsm: &Fsm) -> String {
    let mut out = String::new();

    let symbols: Vec<String> = fsm.symbols().map(ToString::to_string).collect();
    push_statement(&mut out, "SYMBOLS", &symbols.join(" "));

    let states: Vec<&str> = fsm.states().iter().map(|s| s.as_str()).collect();
    push_statement(&mut out, "STATES", &states.join(" "));

    if let Some(initial) = fsm.initial_state() {
        push_statement(&mut out, "INITIAL-STATE", initial.as_str());
    }

    let finals: Vec<&str> = fsm.final_states().map(|s| s.as_str()).collect();
    push_statement(&mut out, "FINAL-STATES", &finals.join(" "));

    let transitions: Vec<String> = fsm
        .transitions()
        .map(|(key, to)| format!("{} {} {}", key.symbol, key.from, to))
        .collect();
    push_statement(&mut out, "TRANSITIONS", &transitions.join(", "));

    out
}

/// Write the rendered script to `path`, replacing any existing file.
pub fn write_script(fsm: &Fsm, path: &str) -> Result<(), CheckpointError> {
    fs::write(path, render_script(fsm)).map_err(|e| CheckpointError::file(path, e))
}

fn push_statement(out: &mut String, keyword: &str, args: &str) {
    if !args.is_empty() {
        let _ = writeln!(out, "{} {};", keyword, args);
    }
}
