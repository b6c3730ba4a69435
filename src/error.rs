use std::path::PathBuf;

use thiserror::Error;

use crate::interpreter::destruct::ArityMismatch;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Error)]
#[error("{line}:{col} error: {msg}")]
pub struct ParserError {
    msg: String,
    pub line: usize,
    pub col: usize,
}

impl ParserError {
    pub fn new(msg: &str, line: usize, col: usize) -> Self {
        ParserError {
            msg: String::from(msg),
            line,
            col,
        }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    pub fn format(&self, filename: &str) -> String {
        format!(
            "{}:{}:{} error: {}",
            filename, self.line, self.col, self.msg
        )
    }
}

/// What went wrong while executing a statement
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Unpack(#[from] ArityMismatch),

    #[error("{0}")]
    Name(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Index(String),

    #[error("division by zero")]
    ZeroDivision,

    #[error("integer overflow")]
    Overflow,

    #[error("result is too large")]
    Memory,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("{line}:{col} error: {kind}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub line: usize,
    pub col: usize,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, position: (usize, usize)) -> Self {
        Self {
            kind,
            line: position.0,
            col: position.1,
        }
    }

    pub fn string(&self, filename: &str) -> String {
        format!(
            "{}:{}:{} error: {}",
            filename, self.line, self.col, self.kind
        )
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{} syntax error(s)", .0.len())]
    Parse(Vec<ParserError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Renders the error the way the runner shows it, quoting the offending source line
    pub fn report(&self, filename: &str, source: &str) -> String {
        match self {
            Error::Parse(errors) => errors
                .iter()
                .map(|err| with_excerpt(err.format(filename), source, err.line))
                .collect::<Vec<String>>()
                .join("\n"),
            Error::Runtime(err) => with_excerpt(err.string(filename), source, err.line),
            Error::Io { .. } => self.to_string(),
        }
    }
}

fn with_excerpt(message: String, source: &str, line: usize) -> String {
    match line.checked_sub(1).and_then(|i| source.lines().nth(i)) {
        Some(excerpt) => format!("{}\n{}", message, excerpt),
        None => message,
    }
}
