//! Error types for CSV field tokenizing

use std::fmt;
use thiserror::Error;

/// Result type alias for csvvalue operations
pub type Result<T> = std::result::Result<T, CsvError>;

/// Errors returned by [`ParserConfig::fields`](crate::ParserConfig::fields)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// The record is empty once its trailing line terminator is removed.
    ///
    /// This means "no record", not malformed data.
    #[error("end of input")]
    EndOfInput,

    /// The configured delimiter can never separate fields
    #[error("invalid field delimiter {0:?}")]
    InvalidDelimiter(char),

    /// Malformed quoting, with the position where it was detected
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CsvError {
    /// Check whether this is the "no record" condition
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, CsvError::EndOfInput)
    }

    /// Get the positioned parse error, if any
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            CsvError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Kind of quoting fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// A quote inside a field that did not start with a quote
    #[error("bare \" in non-quoted-field")]
    BareQuote,
    /// A quoted field that is never closed, or closed by a quote followed by
    /// something other than a quote or the delimiter
    #[error("extraneous or missing \" in quoted-field")]
    UnterminatedQuote,
}

/// Quoting error with its location inside the record
///
/// `line` and `column` are 1-based. `column` counts bytes from the start of
/// `line`; lines advance only on line terminators inside quoted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// Line the record starts on
    pub start_line: usize,
    /// Line where the error was detected
    pub line: usize,
    /// Column where the error was detected
    pub column: usize,
    /// What went wrong
    pub kind: ErrorKind,
}

// Written by hand: the "record on line" prefix only appears for multi-line records
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line != self.line {
            write!(f, "record on line {}; ", self.start_line)?;
        }
        write!(
            f,
            "parse error on line {}, column {}: {}",
            self.line, self.column, self.kind
        )
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
