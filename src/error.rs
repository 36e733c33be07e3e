use serde::Serialize;

/// A message anchored to a character offset in the source, `-1` when there is none.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    pub message: String,
    pub offset: isize,
}

impl Diagnostic {
    pub const NO_OFFSET: isize = -1;

    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: offset as isize,
        }
    }

    pub fn unanchored(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: Self::NO_OFFSET,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, thiserror::Error)]
#[serde(tag = "stage", content = "error")]
pub enum ErrorKind {
    #[error("lex error: {0}")]
    LexError(Diagnostic),
    #[error("parse error: {0}")]
    ParseError(Diagnostic),
    #[error("validation error: {0}")]
    ValidationError(Diagnostic),
}

impl ErrorKind {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Self::LexError(d) | Self::ParseError(d) | Self::ValidationError(d) => d,
        }
    }
}

pub type PResult<T> = Result<T, ErrorKind>;
