use std::fmt;
use thiserror::Error;

/// The error type for order parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: '{input}'")]
pub struct ParseError {
    kind: ParseErrorKind,
    input: String,
}

impl ParseError {
    /// Creates a new error of the given `kind` for the relevant input
    /// string. `input` should be the smallest part of the string where the
    /// error was found, not the entire order.
    pub fn new(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        ParseError {
            kind,
            input: input.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

/// Different kinds of parsing error; this is not meant to be exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The text is not any recognized order form.
    UnrecognizedOrder,
    MalformedSquare,
    InvalidPieceKind,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseErrorKind::UnrecognizedOrder => write!(f, "Unrecognized order"),
            ParseErrorKind::MalformedSquare => write!(f, "Malformed square"),
            ParseErrorKind::InvalidPieceKind => write!(f, "Invalid piece kind"),
        }
    }
}
