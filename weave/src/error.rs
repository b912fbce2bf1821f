use thiserror::Error;

/// A malformed parallel regular expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError<'a> {
    #[error("unexpected character '{0}' at byte offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of input while parsing {0}")]
    UnexpectedEof(&'static str),
    #[error("unterminated bracketed symbol starting at byte offset {0}")]
    UnterminatedBracket(usize),
    #[error("trailing input after a complete expression: '{0}'")]
    TrailingInput(&'a str),
    #[error("empty expression")]
    Empty,
}

/// Errors that can occur while lowering or determinizing an automaton.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("automaton exceeds the implementation-defined size ceiling ({0} states)")]
    TooLarge(usize),
}

/// An error raised by the host's action dispatcher, propagated unchanged
/// except for being tagged with the name of the action that raised it.
#[derive(Debug, Error)]
#[error("dispatch failed for action '{name}': {source}")]
pub struct DispatchError<E: std::error::Error + 'static> {
    pub name: String,
    #[source]
    pub source: E,
}

/// The error type of [`crate::driver::Compiled::run_once`] and
/// [`crate::driver::Compiled::run_any`]: either the DFA could not be built,
/// or the dispatcher rejected one of the plan's symbols.
#[derive(Debug, Error)]
pub enum RunError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError<E>),
}
