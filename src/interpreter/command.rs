//! Parsed commands and arity validation.

use super::error::CommandError;
use super::lexer::{split_triples, tokenize, Keyword};

/// One `symbol from to` entry of a TRANSITIONS list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionSpec {
    pub symbol: String,
    pub from: String,
    pub to: String,
}

/// A statement after tokenizing and arity checks.
///
/// Empty argument lists on SYMBOLS, STATES, FINAL-STATES and TRANSITIONS
/// are queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Symbols(Vec<String>),
    States(Vec<String>),
    InitialState(String),
    FinalStates(Vec<String>),
    Transitions(Vec<TransitionSpec>),
    Print(Option<String>),
    Compile(String),
    Load(String),
    Execute(String),
    Clear,
    Log(Option<String>),
    Exit,
}

impl Command {
    /// Parse one statement (no trailing semicolon).
    pub fn parse(statement: &str) -> Result<Self, CommandError> {
        let tokens = tokenize(statement);
        let Some((&head, args)) = tokens.split_first() else {
            return Err(CommandError::InvalidCommand("empty statement".to_string()));
        };
        let keyword = Keyword::from_token(head).ok_or_else(|| {
            CommandError::InvalidCommand(format!("unknown keyword {}", head.to_ascii_uppercase()))
        })?;
        let owned = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();

        let command = match keyword {
            Keyword::Symbols => Self::Symbols(owned(args)),
            Keyword::States => Self::States(owned(args)),
            Keyword::FinalStates => Self::FinalStates(owned(args)),
            Keyword::InitialState => Self::InitialState(exactly_one(keyword, args, "one state")?),
            Keyword::Transitions => {
                let rest = statement.trim_start()[head.len()..].trim();
                if rest.is_empty() {
                    Self::Transitions(Vec::new())
                } else {
                    Self::Transitions(parse_triples(rest)?)
                }
            }
            Keyword::Print => Self::Print(at_most_one(keyword, args, "a file name")?),
            Keyword::Compile => Self::Compile(exactly_one(keyword, args, "a file name")?),
            Keyword::Load => Self::Load(exactly_one(keyword, args, "a file name")?),
            Keyword::Execute => match args {
                [] => {
                    return Err(CommandError::InvalidInput(
                        "EXECUTE requires an input string".to_string(),
                    ))
                }
                [input] => Self::Execute(input.to_string()),
                _ => {
                    return Err(CommandError::InvalidCommand(
                        "EXECUTE takes a single input string without spaces".to_string(),
                    ))
                }
            },
            Keyword::Log => Self::Log(at_most_one(keyword, args, "a file name")?),
            Keyword::Clear => {
                no_args(keyword, args)?;
                Self::Clear
            }
            Keyword::Exit => {
                no_args(keyword, args)?;
                Self::Exit
            }
        };
        Ok(command)
    }

    pub fn keyword(&self) -> Keyword {
        match self {
            Self::Symbols(_) => Keyword::Symbols,
            Self::States(_) => Keyword::States,
            Self::InitialState(_) => Keyword::InitialState,
            Self::FinalStates(_) => Keyword::FinalStates,
            Self::Transitions(_) => Keyword::Transitions,
            Self::Print(_) => Keyword::Print,
            Self::Compile(_) => Keyword::Compile,
            Self::Load(_) => Keyword::Load,
            Self::Execute(_) => Keyword::Execute,
            Self::Clear => Keyword::Clear,
            Self::Log(_) => Keyword::Log,
            Self::Exit => Keyword::Exit,
        }
    }
}

fn parse_triples(rest: &str) -> Result<Vec<TransitionSpec>, CommandError> {
    split_triples(rest)
        .into_iter()
        .map(|triple| match tokenize(triple).as_slice() {
            [symbol, from, to] => Ok(TransitionSpec {
                symbol: symbol.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => Err(CommandError::InvalidCommand(format!(
                "invalid transition format '{}', expected <symbol> <from> <to>",
                triple
            ))),
        })
        .collect()
}

fn exactly_one(keyword: Keyword, args: &[&str], what: &str) -> Result<String, CommandError> {
    match args {
        [arg] => Ok(arg.to_string()),
        _ => Err(CommandError::InvalidCommand(format!(
            "{} requires {}",
            keyword, what
        ))),
    }
}

fn at_most_one(keyword: Keyword, args: &[&str], what: &str) -> Result<Option<String>, CommandError> {
    match args {
        [] => Ok(None),
        [arg] => Ok(Some(arg.to_string())),
        _ => Err(CommandError::InvalidCommand(format!(
            "{} takes at most {}",
            keyword, what
        ))),
    }
}

fn no_args(keyword: Keyword, args: &[&str]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::InvalidCommand(format!(
            "{} takes no arguments",
            keyword
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(symbol: &str, from: &str, to: &str) -> TransitionSpec {
        TransitionSpec {
            symbol: symbol.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn declarations_and_queries() {
        assert_eq!(
            Command::parse("symbols a b").unwrap(),
            Command::Symbols(vec!["a".into(), "b".into()])
        );
        assert_eq!(Command::parse("STATES").unwrap(), Command::States(vec![]));
        assert_eq!(Command::parse("final-states").unwrap(), Command::FinalStates(vec![]));
    }

    #[test]
    fn initial_state_requires_exactly_one() {
        assert_eq!(
            Command::parse("INITIAL-STATE q0").unwrap(),
            Command::InitialState("q0".into())
        );
        assert!(matches!(
            Command::parse("INITIAL-STATE"),
            Err(CommandError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("INITIAL-STATE q0 q1"),
            Err(CommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn transitions_parse_comma_separated_triples() {
        assert_eq!(
            Command::parse("TRANSITIONS 1 q0 q1, 0 q1 q0").unwrap(),
            Command::Transitions(vec![spec("1", "q0", "q1"), spec("0", "q1", "q0")])
        );
        assert_eq!(
            Command::parse("transitions 1 q0 q1,0 q1 q0,").unwrap(),
            Command::Transitions(vec![spec("1", "q0", "q1"), spec("0", "q1", "q0")])
        );
        assert_eq!(Command::parse("TRANSITIONS").unwrap(), Command::Transitions(vec![]));
    }

    #[test]
    fn malformed_triple_names_the_text() {
        let err = Command::parse("TRANSITIONS 1 q0 q1, 0 q1").unwrap_err();
        assert!(err.to_string().contains("'0 q1'"), "{}", err);

        let err = Command::parse("TRANSITIONS 1 q0 q1 0 q1 q0").unwrap_err();
        assert!(matches!(err, CommandError::InvalidCommand(_)));
    }

    #[test]
    fn optional_file_arguments() {
        assert_eq!(Command::parse("PRINT").unwrap(), Command::Print(None));
        assert_eq!(
            Command::parse("print out.txt").unwrap(),
            Command::Print(Some("out.txt".into()))
        );
        assert_eq!(Command::parse("LOG").unwrap(), Command::Log(None));
        assert!(Command::parse("LOG a b").is_err());
    }

    #[test]
    fn required_file_arguments() {
        assert_eq!(
            Command::parse("COMPILE m.fs").unwrap(),
            Command::Compile("m.fs".into())
        );
        assert_eq!(Command::parse("load m.fs").unwrap(), Command::Load("m.fs".into()));
        assert!(Command::parse("COMPILE").is_err());
        assert!(Command::parse("LOAD").is_err());
    }

    #[test]
    fn execute_without_input_is_invalid_input() {
        assert_eq!(
            Command::parse("EXECUTE 0110").unwrap(),
            Command::Execute("0110".into())
        );
        assert!(matches!(
            Command::parse("EXECUTE"),
            Err(CommandError::InvalidInput(_))
        ));
        assert!(matches!(
            Command::parse("EXECUTE 01 10"),
            Err(CommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn bare_commands_reject_arguments() {
        assert_eq!(Command::parse("clear").unwrap(), Command::Clear);
        assert_eq!(Command::parse("Exit").unwrap(), Command::Exit);
        assert!(Command::parse("CLEAR all").is_err());
        assert!(Command::parse("EXIT now").is_err());
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = Command::parse("frobnicate x").unwrap_err();
        assert_eq!(err.to_string(), "Invalid command: unknown keyword FROBNICATE");
    }

    #[test]
    fn keyword_matches_variant() {
        assert_eq!(Command::parse("LOG").unwrap().keyword(), Keyword::Log);
        assert_eq!(
            Command::parse("TRANSITIONS").unwrap().keyword(),
            Keyword::Transitions
        );
    }
}
