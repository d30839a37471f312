//! CSV record tokenizing with RFC 4180-like behavior

use crate::error::{CsvError, ErrorKind, ParseError, Result};

const QUOTE: char = '"';

/// Options for splitting one CSV record into fields
///
/// The fields are public and may be changed between calls. Every call works
/// on its own copy, and the delimiter is only validated when a record is
/// tokenized.
///
/// # Examples
///
/// ```
/// use csvvalue::ParserConfig;
///
/// let parser = ParserConfig::new().delimiter(';').trim_leading_space(true);
/// let fields = parser.fields("a; b;\"c;d\"", None).unwrap();
/// assert_eq!(fields, vec!["a", "b", "c;d"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// Field separator, `,` by default
    pub delimiter: char,
    /// Treat stray and unterminated quotes as literal content
    pub lazy_quotes: bool,
    /// Skip spaces and tabs at the start of each field
    pub trim_leading_space: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            lazy_quotes: false,
            trim_leading_space: false,
        }
    }
}

impl ParserConfig {
    /// Create a parser with comma delimiter, strict quotes and no trimming
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter (builder pattern)
    pub fn delimiter(mut self, delim: char) -> Self {
        self.delimiter = delim;
        self
    }

    /// Enable or disable lenient quote handling (builder pattern)
    pub fn lazy_quotes(mut self, lazy: bool) -> Self {
        self.lazy_quotes = lazy;
        self
    }

    /// Enable or disable leading space trimming (builder pattern)
    pub fn trim_leading_space(mut self, trim: bool) -> Self {
        self.trim_leading_space = trim;
        self
    }

    /// Check that the delimiter can separate fields
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::InvalidDelimiter`] when the delimiter is `"`,
    /// `\r`, `\n`, NUL or U+FFFD.
    pub fn validate(&self) -> Result<()> {
        match self.delimiter {
            QUOTE | '\r' | '\n' | '\0' | char::REPLACEMENT_CHARACTER => {
                Err(CsvError::InvalidDelimiter(self.delimiter))
            }
            _ => Ok(()),
        }
    }

    /// Split one record into unescaped fields
    ///
    /// When `reuse` is given, its storage backs the returned vector. Fields
    /// from a previous call are overwritten.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvvalue::ParserConfig;
    ///
    /// let parser = ParserConfig::new();
    /// let row = parser.fields("foo,bar,baz", None).unwrap();
    /// let row = parser.fields("aaa,\"b\"\"b\"", Some(row)).unwrap();
    /// assert_eq!(row, vec!["aaa", "b\"b"]);
    /// ```
    pub fn fields(&self, record: &str, reuse: Option<Vec<String>>) -> Result<Vec<String>> {
        let mut out = reuse.unwrap_or_default();
        self.fields_into(record, &mut out)?;
        Ok(out)
    }

    /// Split one record into `out`, truncating or extending it to the field count
    ///
    /// Existing strings in `out` are cleared and refilled in place, so
    /// repeated calls with records of equal or fewer fields do not allocate
    /// once the strings have grown large enough. On error the contents of
    /// `out` are unspecified but it can be passed in again.
    pub fn fields_into(&self, record: &str, out: &mut Vec<String>) -> Result<()> {
        let config = *self;
        config.validate()?;

        let record = strip_line_terminator(record);
        if record.is_empty() {
            return Err(CsvError::EndOfInput);
        }

        let capacity = out.capacity();
        let mut tokenizer = Tokenizer::new(config, out);
        for ch in record.chars() {
            tokenizer.step(ch)?;
        }
        let count = tokenizer.finish()?;
        out.truncate(count);

        tracing::trace!(
            fields = count,
            grew = out.capacity() != capacity,
            "tokenized record"
        );
        Ok(())
    }
}

/// Remove one trailing `\n` or `\r\n`
fn strip_line_terminator(record: &str) -> &str {
    match record.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => record,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first character of a field
    FieldStart,
    /// Inside a field that did not start with a quote
    Unquoted,
    /// Inside a quoted field
    Quoted,
    /// Just after a quote inside a quoted field
    QuoteInQuoted,
}

/// Per-call scanner state
struct Tokenizer<'a> {
    config: ParserConfig,
    out: &'a mut Vec<String>,
    /// Fields started so far; the last one is being filled
    fields: usize,
    state: State,
    line: usize,
    /// Bytes consumed on the current line
    column: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(config: ParserConfig, out: &'a mut Vec<String>) -> Self {
        Self {
            config,
            out,
            fields: 0,
            state: State::FieldStart,
            line: 1,
            column: 0,
        }
    }

    fn step(&mut self, ch: char) -> Result<()> {
        match self.state {
            State::FieldStart => self.field_start(ch),
            State::Unquoted => self.unquoted(ch)?,
            State::Quoted => self.quoted(ch),
            State::QuoteInQuoted => self.quote_in_quoted(ch)?,
        }

        if ch == '\n' && self.state == State::Quoted {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += ch.len_utf8();
        }
        Ok(())
    }

    fn field_start(&mut self, ch: char) {
        if ch == self.config.delimiter {
            // empty field, the next one starts right away
            self.begin_field();
        } else if self.config.trim_leading_space && (ch == ' ' || ch == '\t') {
            // skipped
        } else if ch == QUOTE {
            self.begin_field();
            self.state = State::Quoted;
        } else {
            self.begin_field();
            self.state = State::Unquoted;
            self.push(ch);
        }
    }

    fn unquoted(&mut self, ch: char) -> Result<()> {
        if ch == self.config.delimiter {
            self.state = State::FieldStart;
        } else if ch == QUOTE && !self.config.lazy_quotes {
            return Err(self.error(self.column + 1, ErrorKind::BareQuote));
        } else {
            self.push(ch);
        }
        Ok(())
    }

    fn quoted(&mut self, ch: char) {
        if ch == QUOTE {
            self.state = State::QuoteInQuoted;
        } else {
            self.push(ch);
        }
    }

    fn quote_in_quoted(&mut self, ch: char) -> Result<()> {
        if ch == QUOTE {
            self.push(QUOTE);
            self.state = State::Quoted;
        } else if ch == self.config.delimiter {
            self.state = State::FieldStart;
        } else if self.config.lazy_quotes {
            self.push(QUOTE);
            self.state = State::Quoted;
            self.quoted(ch);
        } else {
            // the closing quote is the last byte consumed
            return Err(self.error(self.column, ErrorKind::UnterminatedQuote));
        }
        Ok(())
    }

    /// Close the record, returning the number of fields
    fn finish(mut self) -> Result<usize> {
        match self.state {
            State::FieldStart => self.begin_field(),
            State::Quoted if !self.config.lazy_quotes => {
                return Err(self.error(self.column + 1, ErrorKind::UnterminatedQuote));
            }
            _ => {}
        }
        Ok(self.fields)
    }

    fn begin_field(&mut self) {
        match self.out.get_mut(self.fields) {
            Some(slot) => slot.clear(),
            None => self.out.push(String::new()),
        }
        self.fields += 1;
    }

    fn push(&mut self, ch: char) {
        // only called after begin_field
        self.out[self.fields - 1].push(ch);
    }

    fn error(&self, column: usize, kind: ErrorKind) -> CsvError {
        CsvError::Parse(ParseError {
            start_line: 1,
            line: self.line,
            column,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: &ParserConfig, line: &str) -> Vec<String> {
        parser.fields(line, None).unwrap()
    }

    fn parse_err(parser: &ParserConfig, line: &str) -> ParseError {
        match parser.fields(line, None) {
            Err(CsvError::Parse(e)) => e,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_simple() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, r#""a,b",c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn test_escaped_quotes() {
        let parser = ParserConfig::new();
        assert_eq!(
            parse(&parser, r#""Say ""Hello""",world"#),
            vec![r#"Say "Hello""#, "world"]
        );
    }

    #[test]
    fn test_empty_fields() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_all_empty() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, ",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_quoted_with_newline() {
        let parser = ParserConfig::new();
        assert_eq!(
            parse(&parser, "\"Line 1\nLine 2\",normal"),
            vec!["Line 1\nLine 2", "normal"]
        );
    }

    #[test]
    fn test_quoted_keeps_embedded_crlf() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "\"a\r\nb\"\r\n"), vec!["a\r\nb"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let parser = ParserConfig::new().delimiter(';');
        assert_eq!(parse(&parser, r#"a;"b;c";d"#), vec!["a", "b;c", "d"]);
    }

    #[test]
    fn test_empty_line() {
        let parser = ParserConfig::new();
        assert_eq!(parser.fields("", None), Err(CsvError::EndOfInput));
        assert_eq!(parser.fields("\r\n", None), Err(CsvError::EndOfInput));
    }

    #[test]
    fn test_only_one_terminator_stripped() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "\n\n"), vec!["\n"]);
    }

    #[test]
    fn test_single_field() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "hello"), vec!["hello"]);
    }

    #[test]
    fn test_quoted_empty() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, r#""","""#), vec!["", ""]);
    }

    #[test]
    fn test_trim_leading_tabs() {
        let parser = ParserConfig::new().trim_leading_space(true);
        assert_eq!(parse(&parser, "\t a,\t\"b\""), vec!["a", "b"]);
        assert_eq!(parse(&parser, " \t"), vec![""]);
    }

    #[test]
    fn test_leading_tab_kept_without_trim() {
        let parser = ParserConfig::new();
        assert_eq!(parse(&parser, "\ta"), vec!["\ta"]);
    }

    #[test]
    fn test_trim_does_not_eat_tab_delimiter() {
        let parser = ParserConfig::new().delimiter('\t').trim_leading_space(true);
        assert_eq!(parse(&parser, "a\t\t  b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_unterminated_after_embedded_newline() {
        let parser = ParserConfig::new();
        let err = parse_err(&parser, "\"a\nb");
        assert_eq!(err.start_line, 1);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 2);
        assert_eq!(err.kind, ErrorKind::UnterminatedQuote);
    }

    #[test]
    fn test_bare_quote_after_embedded_newline() {
        let parser = ParserConfig::new();
        let err = parse_err(&parser, "\"x\ny\",a\"b");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert_eq!(err.kind, ErrorKind::BareQuote);
    }

    #[test]
    fn test_column_counts_bytes() {
        let parser = ParserConfig::new();
        let err = parse_err(&parser, "é,a\"");
        assert_eq!(err.column, 5);
    }

    #[test]
    fn test_lazy_unterminated_quote() {
        let parser = ParserConfig::new().lazy_quotes(true);
        assert_eq!(parse(&parser, "a,\"bc"), vec!["a", "bc"]);
    }

    #[test]
    fn test_lazy_quote_keeps_field_quoted() {
        let parser = ParserConfig::new().lazy_quotes(true);
        assert_eq!(parse(&parser, r#""a"b,c",d"#), vec![r#"a"b,c"#, "d"]);
    }

    #[test]
    fn test_invalid_delimiters() {
        for delim in ['"', '\r', '\n', '\0', char::REPLACEMENT_CHARACTER] {
            let parser = ParserConfig::new().delimiter(delim);
            assert_eq!(
                parser.fields("a,b", None),
                Err(CsvError::InvalidDelimiter(delim))
            );
            // checked before the empty record
            assert_eq!(parser.fields("", None), Err(CsvError::InvalidDelimiter(delim)));
        }
    }

    #[test]
    fn test_fields_into_reuses_strings() {
        let parser = ParserConfig::new();
        let mut out = Vec::new();
        parser.fields_into("first value,second value,third", &mut out).unwrap();
        let first = out[0].as_ptr();
        let second = out[1].as_ptr();

        parser.fields_into("one,two", &mut out).unwrap();
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(out[0].as_ptr(), first);
        assert_eq!(out[1].as_ptr(), second);
    }

    #[test]
    fn test_fields_into_grows() {
        let parser = ParserConfig::new();
        let mut out = vec!["stale".to_string()];
        parser.fields_into("a,b,c", &mut out).unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_strip_line_terminator() {
        assert_eq!(strip_line_terminator("a\r\n"), "a");
        assert_eq!(strip_line_terminator("a\n"), "a");
        assert_eq!(strip_line_terminator("a\r"), "a\r");
        assert_eq!(strip_line_terminator("a"), "a");
    }
}
