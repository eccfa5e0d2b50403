//! Statement acquisition.
//!
//! Physical lines are pushed into a [`StatementBuffer`], which accumulates
//! text until a semicolon closes a statement. Text after the semicolon seeds
//! the next statement. A line without any semicolon is flagged but kept, so
//! unterminated input is never lost. Blank lines are skipped, and so is a
//! line starting with `;` when no statement is pending (a comment line).

/// One logical statement, without its terminating semicolon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    /// Physical line on which the statement ended
    pub line: usize,
    /// False when the statement was closed by end of input
    pub terminated: bool,
}

/// Output of the buffer, in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadEvent {
    Statement(Statement),
    Diagnostic { line: usize, message: String },
}

/// Accumulates physical lines into semicolon-terminated statements.
///
/// # Example
///
/// ```rust
/// use fsm_designer::interpreter::{ReadEvent, StatementBuffer};
///
/// let mut buffer = StatementBuffer::new();
/// let events = buffer.push_line("STATES q0");
/// assert!(matches!(events[0], ReadEvent::Diagnostic { line: 1, .. }));
///
/// let events = buffer.push_line("q1; CLEAR");
/// match &events[0] {
///     ReadEvent::Statement(s) => assert_eq!(s.text, "STATES q0 q1"),
///     other => panic!("unexpected {:?}", other),
/// }
/// assert!(buffer.is_accumulating());
/// ```
#[derive(Debug, Default)]
pub struct StatementBuffer {
    pending: String,
    line: usize,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// True while unterminated text is waiting for a semicolon.
    pub fn is_accumulating(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    /// Consume one physical line.
    pub fn push_line(&mut self, raw: &str) -> Vec<ReadEvent> {
        self.line += 1;
        let line = raw.trim_end_matches(['\r', '\n']);
        let mut events = Vec::new();

        if line.trim().is_empty() {
            return events;
        }
        // Between statements, a line starting with ';' is a comment
        if !self.is_accumulating() && line.trim_start().starts_with(';') {
            return events;
        }

        let mut segments = line.split(';');
        // `split` always yields at least one segment
        let mut current = segments.next().unwrap_or_default();
        let mut closed_any = false;

        for next in segments {
            self.pending.push_str(current);
            self.emit(true, &mut events);
            closed_any = true;
            current = next;
        }

        if !closed_any {
            events.push(ReadEvent::Diagnostic {
                line: self.line,
                message: "semicolon expected".to_string(),
            });
        }

        if !current.trim().is_empty() {
            self.pending.push_str(current);
            self.pending.push(' ');
        }
        events
    }

    /// Flush at end of input.
    ///
    /// Pending text becomes a final, implicitly terminated statement.
    pub fn finish(&mut self) -> Vec<ReadEvent> {
        let mut events = Vec::new();
        if self.is_accumulating() {
            events.push(ReadEvent::Diagnostic {
                line: self.line,
                message: "semicolon missing at end of input".to_string(),
            });
            self.emit(false, &mut events);
        }
        self.pending.clear();
        events
    }

    fn emit(&mut self, terminated: bool, events: &mut Vec<ReadEvent>) {
        let text = self.pending.split_whitespace().collect::<Vec<_>>().join(" ");
        self.pending.clear();
        if !text.is_empty() {
            events.push(ReadEvent::Statement(Statement {
                text,
                line: self.line,
                terminated,
            }));
        }
    }
}
