//! # csvvalue
//!
//! Split a single CSV record into its unescaped fields.
//!
//! The record may end with one `\n` or `\r\n`, and quoted fields may contain
//! delimiters, doubled quotes and line terminators. Locating record
//! boundaries in a larger stream is left to the caller.
//!
//! ## Quick Start
//!
//! ```
//! let fields = csvvalue::fields("a,\"b,cc ,ddd\",e", None).unwrap();
//! assert_eq!(fields, vec!["a", "b,cc ,ddd", "e"]);
//!
//! // Hand the previous result back in to reuse its storage
//! let fields = csvvalue::fields("x,y", Some(fields)).unwrap();
//! assert_eq!(fields, vec!["x", "y"]);
//! ```
//!
//! ## Configuration
//!
//! ```
//! use csvvalue::{CsvError, ErrorKind, ParserConfig};
//!
//! let strict = ParserConfig::new();
//! let err = strict.fields("foo,aa\"bb,cc", None).unwrap_err();
//! let pos = err.parse_error().unwrap();
//! assert_eq!((pos.line, pos.column, pos.kind), (1, 7, ErrorKind::BareQuote));
//!
//! let lazy = ParserConfig::new().lazy_quotes(true);
//! assert_eq!(lazy.fields("foo,aa\"bb,cc", None).unwrap(), vec!["foo", "aa\"bb", "cc"]);
//!
//! assert_eq!(strict.fields("\n", None), Err(CsvError::EndOfInput));
//! ```

pub mod csv;
pub mod error;

pub use csv::ParserConfig;
pub use error::{CsvError, ErrorKind, ParseError, Result};

/// Split `record` into fields with the default configuration
///
/// Comma delimiter, strict quotes, no trimming. See [`ParserConfig::fields`].
pub fn fields(record: &str, reuse: Option<Vec<String>>) -> Result<Vec<String>> {
    ParserConfig::default().fields(record, reuse)
}
