//! Interpreter session: reads statements, dispatches them to the engine
//! and reports results.
//!
//! A [`Session`] owns the single [`Fsm`], the [`SessionLog`] handle and the
//! output stream. Every failing statement becomes one diagnostic line and the
//! session keeps going; only EXIT or a read failure on the primary input
//! stops it. Text scripts run by LOAD re-enter [`Session::run`] with the same
//! engine, so their declarations stay visible to the caller.

use super::command::{Command, TransitionSpec};
use super::error::CommandError;
use super::lexer::{split_statements, tokenize, Keyword};
use super::log::SessionLog;
use super::statement::{ReadEvent, Statement, StatementBuffer};
use crate::checkpoint::script::{render_script, write_script};
use crate::checkpoint::{Checkpoint, Format};
use crate::config::Settings;
use crate::core::{Fsm, FsmError, Halt, Outcome};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where statements come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Prompt before every line
    Interactive,
    /// Echo statements before their results (when enabled)
    Script,
}

type Declare = fn(&mut Fsm, &str) -> Result<Outcome, FsmError>;

pub struct Session<W: Write> {
    fsm: Fsm,
    log: SessionLog,
    settings: Settings,
    out: W,
    running: bool,
    /// Scripts currently being executed, outermost first
    loading: Vec<PathBuf>,
}

impl<W: Write> Session<W> {
    pub fn new(settings: Settings, out: W) -> Self {
        Self {
            fsm: Fsm::new(),
            log: SessionLog::new(),
            settings,
            out,
            running: true,
            loading: Vec::new(),
        }
    }

    pub fn fsm(&self) -> &Fsm {
        &self.fsm
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// False once EXIT has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read `input` line by line until it ends or EXIT runs.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a bad
    /// line becomes an ordinary statement error. Errors are only returned
    /// for failures to read `input` or to write the output stream.
    pub fn run<R: BufRead>(&mut self, mut input: R, mode: Mode) -> io::Result<()> {
        let mut buffer = StatementBuffer::new();
        let mut raw = Vec::new();

        while self.running {
            if mode == Mode::Interactive {
                write!(self.out, "{}", self.settings.prompt)?;
                self.out.flush()?;
            }
            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let events = buffer.push_line(&line);
            self.handle_events(events, mode)?;
        }

        if self.running {
            let events = buffer.finish();
            self.handle_events(events, mode)?;
        }
        Ok(())
    }

    /// LOAD `path` outside of a statement (e.g. a script named on the
    /// command line), printing the result like any other command.
    pub fn load_file(&mut self, path: &str) -> io::Result<()> {
        match self.load(path) {
            Ok(Some(response)) => writeln!(self.out, "{}", response),
            Ok(None) => Ok(()),
            Err(e) => {
                warn!(path, error = %e, "load failed");
                writeln!(self.out, "Error: {}", e)
            }
        }
    }

    fn handle_events(&mut self, events: Vec<ReadEvent>, mode: Mode) -> io::Result<()> {
        for event in events {
            if !self.running {
                break;
            }
            match event {
                ReadEvent::Diagnostic { line, message } => {
                    writeln!(self.out, "Line {}: {}", line, message)?;
                }
                ReadEvent::Statement(statement) => self.execute_statement(&statement, mode)?,
            }
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement, mode: Mode) -> io::Result<()> {
        debug!(line = statement.line, text = %statement.text, "statement read");

        for (i, piece) in split_statements(&statement.text).iter().enumerate() {
            if !self.running {
                break;
            }
            if i > 0 {
                let keyword = tokenize(piece).first().copied().unwrap_or_default();
                writeln!(
                    self.out,
                    "Line {}: semicolon expected before {}",
                    statement.line,
                    keyword.to_ascii_uppercase()
                )?;
            }
            if mode == Mode::Script && self.settings.echo_script {
                writeln!(self.out, "{};", piece)?;
            }
            self.execute_piece(piece, statement.line)?;
        }
        Ok(())
    }

    fn execute_piece(&mut self, text: &str, line: usize) -> io::Result<()> {
        let is_log = tokenize(text)
            .first()
            .and_then(|head| Keyword::from_token(head))
            == Some(Keyword::Log);

        let result = Command::parse(text).and_then(|command| {
            debug!(line, keyword = %command.keyword(), "dispatching");
            self.dispatch(command)
        });

        let logged = match result {
            Ok(Some(response)) => {
                writeln!(self.out, "{}", response)?;
                response
            }
            Ok(None) => String::new(),
            Err(e) => {
                warn!(line, error = %e, "statement failed");
                writeln!(self.out, "Line {}: {}", line, e)?;
                format!("Error: {}", e)
            }
        };

        if !is_log {
            if let Err(e) = self.log.record(&format!("{};", text), &logged) {
                writeln!(self.out, "Error writing to log file: {}", e)?;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Result<Option<String>, CommandError> {
        match command {
            Command::Symbols(args) if args.is_empty() => Ok(Some(list(self.fsm.symbols()))),
            Command::Symbols(args) => Ok(self.declare_each(&args, Fsm::add_symbol)),
            Command::States(args) if args.is_empty() => Ok(Some(list(self.fsm.states()))),
            Command::States(args) => Ok(self.declare_each(&args, Fsm::add_state)),
            Command::InitialState(state) => {
                let outcome = self.fsm.set_initial_state(&state)?;
                Ok(warnings(&outcome))
            }
            Command::FinalStates(args) if args.is_empty() => {
                Ok(Some(list(self.fsm.final_states())))
            }
            Command::FinalStates(args) => Ok(self.declare_each(&args, Fsm::add_final_state)),
            Command::Transitions(specs) if specs.is_empty() => Ok(Some(list(
                self.fsm
                    .transitions()
                    .map(|(key, to)| format!("{} {} {}", key.symbol, key.from, to)),
            ))),
            Command::Transitions(specs) => self.add_transitions(&specs),
            Command::Print(None) => {
                let mut script = render_script(&self.fsm);
                if script.is_empty() {
                    return Ok(Some("FSM is empty".to_string()));
                }
                if let Some(current) = self.fsm.current_state() {
                    script.push_str(&format!("Current state: {}", current));
                }
                Ok(Some(script.trim_end().to_string()))
            }
            Command::Print(Some(path)) => {
                write_script(&self.fsm, &path)?;
                Ok(Some(format!("FSM printed to {}", path)))
            }
            Command::Compile(path) => {
                let format = Format::for_path(&path, &self.settings.compiled_extension)
                    .unwrap_or(Format::Binary);
                Checkpoint::capture(&self.fsm).save(&path, format)?;
                Ok(Some("Compile successful".to_string()))
            }
            Command::Load(path) => self.load(&path),
            Command::Execute(input) => self.execute(&input).map(Some),
            Command::Clear => {
                self.fsm.clear();
                Ok(Some("CLEARED".to_string()))
            }
            Command::Log(None) => Ok(Some(self.log.stop())),
            Command::Log(Some(path)) => self.log.start(&path).map(Some),
            Command::Exit => {
                if self.log.is_active() {
                    self.log.stop();
                }
                self.running = false;
                Ok(Some("TERMINATED BY USER".to_string()))
            }
        }
    }

    /// Apply `declare` to every argument. Failures are reported per item and
    /// do not stop the remaining items.
    fn declare_each(&mut self, args: &[String], declare: Declare) -> Option<String> {
        let mut lines = Vec::new();
        for arg in args {
            match declare(&mut self.fsm, arg) {
                Ok(outcome) => lines.extend(outcome.warnings.iter().map(ToString::to_string)),
                Err(e) => lines.push(format!("Error: {}", e)),
            }
        }
        join_lines(lines)
    }

    /// All triples are applied or none: the first invalid one rejects the
    /// whole statement.
    fn add_transitions(&mut self, specs: &[TransitionSpec]) -> Result<Option<String>, CommandError> {
        let mut staged = self.fsm.clone();
        let mut outcome = Outcome::default();
        for spec in specs {
            outcome = outcome.merge(staged.add_transition(&spec.symbol, &spec.from, &spec.to)?);
        }
        self.fsm = staged;
        Ok(warnings(&outcome))
    }

    fn execute(&self, input: &str) -> Result<String, CommandError> {
        let trace = self.fsm.trace(input);
        match trace.halt() {
            Some(Halt::NotInitialized) => Err(CommandError::InvalidInput(
                Halt::NotInitialized.to_string(),
            )),
            Some(halt) => Ok(format!("{}\nHalted: {}", trace, halt)),
            None => Ok(trace.to_string()),
        }
    }

    /// Replace the machine from a compiled file, or run a text script.
    fn load(&mut self, path: &str) -> Result<Option<String>, CommandError> {
        match Format::for_path(path, &self.settings.compiled_extension) {
            Some(format) => {
                self.fsm = Checkpoint::load_fsm(path, format)?;
                Ok(Some(format!("FSM loaded from {}", path)))
            }
            None => {
                self.run_script(path)?;
                Ok(None)
            }
        }
    }

    fn run_script(&mut self, path: &str) -> Result<(), CommandError> {
        let file = File::open(path).map_err(|e| CommandError::file(path, e))?;
        let key = fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));
        if self.loading.contains(&key) {
            return Err(CommandError::InvalidCommand(format!(
                "recursive LOAD of {}",
                path
            )));
        }

        info!(path, depth = self.loading.len(), "running script");
        self.loading.push(key);
        let result = self
            .run(BufReader::new(file), Mode::Script)
            .map_err(|e| CommandError::file(path, e));
        self.loading.pop();
        result
    }
}

fn list<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn warnings(outcome: &Outcome) -> Option<String> {
    join_lines(outcome.warnings.iter().map(ToString::to_string).collect())
}

fn join_lines(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<Vec<u8>> {
        Session::new(Settings::default(), Vec::new())
    }

    fn run(session: &mut Session<Vec<u8>>, input: &str) -> String {
        let start = session.output().len();
        session.run(input.as_bytes(), Mode::Script).unwrap();
        String::from_utf8_lossy(&session.output()[start..]).into_owned()
    }

    fn quiet() -> Session<Vec<u8>> {
        let settings = Settings {
            echo_script: false,
            ..Settings::default()
        };
        Session::new(settings, Vec::new())
    }

    #[test]
    fn queries_list_declarations() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS b a; STATES q1 q0; SYMBOLS; STATES; FINAL-STATES;");
        assert_eq!(out, "[A, B]\n[Q1, Q0]\n[]\n");
    }

    #[test]
    fn duplicate_declarations_warn() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS a A; STATES q q;");
        assert_eq!(
            out,
            "Warning: symbol A already declared\nWarning: state Q already declared\n"
        );
    }

    #[test]
    fn invalid_items_do_not_block_valid_ones() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS a bc 1;");
        assert!(out.starts_with("Error: Invalid symbol 'bc'"), "{}", out);
        assert_eq!(s.fsm().symbols().count(), 2);
    }

    #[test]
    fn transitions_are_all_or_nothing() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS 0; STATES a b; TRANSITIONS 0 a b, 1 b a;");
        assert!(out.starts_with("Line 1: Invalid transition <1,B> -> A"), "{}", out);
        assert_eq!(s.fsm().transitions().count(), 0);

        let out = run(&mut s, "TRANSITIONS 0 a b, 0 b a; TRANSITIONS;");
        assert_eq!(out, "[0 A B, 0 B A]\n");
    }

    #[test]
    fn execute_reports_trace_and_verdict() {
        let mut s = quiet();
        let out = run(
            &mut s,
            "SYMBOLS 0 1; STATES even odd; FINAL-STATES even;
             TRANSITIONS 0 even even, 1 even odd, 0 odd odd, 1 odd even;
             EXECUTE 1010; EXECUTE 10;",
        );
        assert_eq!(out, "EVEN ODD ODD EVEN EVEN YES\nEVEN ODD ODD NO\n");
    }

    #[test]
    fn execute_reports_halt() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS 0 1; STATES a; TRANSITIONS 0 a a; EXECUTE 01;");
        assert_eq!(out, "A A NO\nHalted: no transition for <1,A>\n");
    }

    #[test]
    fn execute_on_empty_fsm_is_an_error() {
        let mut s = quiet();
        let out = run(&mut s, "EXECUTE 1;");
        assert_eq!(
            out,
            "Line 1: Invalid input: FSM is not initialized: no initial state\n"
        );
    }

    #[test]
    fn clear_wipes_definition() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS a; STATES q; CLEAR; SYMBOLS; STATES; PRINT;");
        assert_eq!(out, "CLEARED\n[]\n[]\nFSM is empty\n");
        assert!(s.fsm().is_empty());
    }

    #[test]
    fn embedded_keyword_splits_statement() {
        let mut s = quiet();
        let out = run(&mut s, "STATES q0 SYMBOLS a;");
        assert_eq!(out, "Line 1: semicolon expected before SYMBOLS\n");
        assert_eq!(s.fsm().states().len(), 1);
        assert_eq!(s.fsm().symbols().count(), 1);
    }

    #[test]
    fn errors_do_not_stop_the_session() {
        let mut s = quiet();
        let out = run(&mut s, "BOGUS;\nINITIAL-STATE;\nSTATES q;");
        assert_eq!(
            out,
            "Line 1: Invalid command: unknown keyword BOGUS\n\
             Line 2: Invalid command: INITIAL-STATE requires one state\n"
        );
        assert_eq!(s.fsm().states().len(), 1);
    }

    #[test]
    fn exit_stops_processing() {
        let mut s = quiet();
        let out = run(&mut s, "STATES a; EXIT; STATES b;\nSTATES c;");
        assert_eq!(out, "TERMINATED BY USER\n");
        assert!(!s.is_running());
        assert_eq!(s.fsm().states().len(), 1);
    }

    #[test]
    fn missing_final_semicolon_still_runs() {
        let mut s = quiet();
        let out = run(&mut s, "STATES a b");
        assert_eq!(
            out,
            "Line 1: semicolon expected\nLine 1: semicolon missing at end of input\n"
        );
        assert_eq!(s.fsm().states().len(), 2);
    }

    #[test]
    fn script_mode_echoes_statements() {
        let mut s = session();
        let out = run(&mut s, "states a;clear;");
        assert_eq!(out, "states a;\nclear;\nCLEARED\n");
    }

    #[test]
    fn interactive_mode_prompts() {
        let mut s = session();
        s.run("CLEAR;\n".as_bytes(), Mode::Interactive).unwrap();
        let out = String::from_utf8(s.into_output()).unwrap();
        assert_eq!(out, "? CLEARED\n? ");
    }

    #[test]
    fn load_of_missing_file_is_reported() {
        let mut s = quiet();
        let out = run(&mut s, "LOAD /no/such/script.txt;");
        assert!(out.starts_with("Line 1: Error with file '/no/such/script.txt'"), "{}", out);
        assert!(s.is_running());
    }

    #[test]
    fn invalid_utf8_line_is_a_statement_error() {
        let mut s = quiet();
        s.run(&b"STATES a;\n\xff\xfe;\nSTATES b;\n"[..], Mode::Script)
            .unwrap();
        let out = String::from_utf8(s.into_output()).unwrap();
        assert_eq!(out, "Line 2: Invalid command: unknown keyword \u{FFFD}\u{FFFD}\n");
    }

    #[test]
    fn invalid_utf8_keeps_interactive_session_alive() {
        let mut s = quiet();
        s.run(&b"STATES a;\n\xff;\nSTATES b;\n"[..], Mode::Interactive)
            .unwrap();
        assert!(s.is_running());
        assert_eq!(s.fsm().states().len(), 2);
    }

    #[test]
    fn execute_input_spelling_a_keyword() {
        let mut s = quiet();
        let out = run(
            &mut s,
            "SYMBOLS c l e a r; STATES q;
             TRANSITIONS c q q, l q q, e q q, a q q, r q q;
             EXECUTE clear; STATES;",
        );
        assert_eq!(out, "Q Q Q Q Q Q NO\n[Q]\n");
        assert_eq!(s.fsm().symbols().count(), 5);
    }

    #[test]
    fn print_shows_current_state() {
        let mut s = quiet();
        let out = run(&mut s, "SYMBOLS a; STATES q; PRINT;");
        assert_eq!(
            out,
            "SYMBOLS A;\nSTATES Q;\nINITIAL-STATE Q;\nCurrent state: Q\n"
        );
    }
}
