//! Error taxonomy for one script run.
//!
//! Everything here is recoverable at the run boundary: the caller keeps its
//! persisted state and shows the message to the program author. Host-level
//! programming errors (dispatching finish-day with no workout in progress,
//! …) are not script errors and panic instead.

use std::fmt;
use thiserror::Error;

/// Position of a token or offending character in the script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub offset: usize,
    /// 1-based.
    pub line: u32,
    /// 1-based column, in characters.
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{pos}: {message}")]
pub struct LexError {
    pub pos: Pos,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{pos}: {message}")]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("unknown binding `{field}[{exercise}, {set}]`")]
    UnknownBinding {
        field: String,
        exercise: String,
        set: usize,
    },
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{name}` takes {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("script never produced a value for `{0}`")]
    MissingResult(&'static str),
}

/// Unified failure surface for a whole run, as seen by the host application.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("syntax error: {0}")]
    Lex(#[from] LexError),
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
    /// A program with no days has nothing to plan or rotate through.
    #[error("program has no days")]
    EmptyProgram,
}
