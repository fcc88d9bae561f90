//! Error types for DeX parsing and value coercion.
//!
//! Two independent error families live here:
//!
//! - [`ParseError`]: fatal parse-time failures. Every parse error carries the
//!   byte offset, the 1-based line number and a rendered source context
//!   window (two lines of context either side, with a caret under the
//!   failing column).
//! - [`CoerceError`]: model-time failures raised by the typed accessors on
//!   [`Table`](crate::Table) and [`ArrayView`](crate::ArrayView) when a
//!   stored value is read as an incompatible type. No accessor silently
//!   truncates; a lossy narrowing is an error.
//!
//! ## Examples
//!
//! ```rust
//! let err = dex::from_str("{a:1,,}").unwrap_err();
//! assert!(matches!(err.kind(), dex::ParseErrorKind::UnexpectedToken(_)));
//! assert_eq!(err.line(), 1);
//! // The rendered message points at the offending column:
//! assert!(err.to_string().contains('^'));
//! ```

use std::fmt;
use thiserror::Error;

/// Classification of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Grammar violation: stray delimiter, unterminated string, value
    /// expected, mismatched closing brace, trailing top-level content.
    UnexpectedToken(String),
    /// Two entries of one scope resolved to the same effective key.
    KeyDuplication(String),
    /// Malformed escape sequence inside a string literal.
    InvalidEscape(String),
    /// Input ended while a scope or string literal was still open.
    UnexpectedEof(String),
    /// Failure reading the underlying source (wrapper entry points only).
    Io(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedToken(msg) => write!(f, "unexpected token: {}", msg),
            ParseErrorKind::KeyDuplication(key) => write!(f, "duplicate key `{}`", key),
            ParseErrorKind::InvalidEscape(msg) => write!(f, "invalid escape sequence: {}", msg),
            ParseErrorKind::UnexpectedEof(msg) => write!(f, "unexpected end of input: {}", msg),
            ParseErrorKind::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

/// A fatal parse failure with source position diagnostics.
///
/// The parser never returns a partially built table; the first grammar
/// violation aborts the whole call with one of these.
#[derive(Debug, Clone, Error)]
#[error("{kind} at line {line}, column {column}\n{context}")]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
    line: usize,
    column: usize,
    context: String,
}

impl ParseError {
    /// Builds an error anchored at `offset` into `src`, rendering the
    /// surrounding source context eagerly so the error owns everything it
    /// needs to display itself.
    pub(crate) fn at(kind: ParseErrorKind, src: &str, offset: usize) -> Self {
        let (line, column, context) = render_context(src, offset);
        ParseError {
            kind,
            offset,
            line,
            column,
            context,
        }
    }

    pub(crate) fn io(msg: impl fmt::Display) -> Self {
        ParseError {
            kind: ParseErrorKind::Io(msg.to_string()),
            offset: 0,
            line: 0,
            column: 0,
            context: String::new(),
        }
    }

    /// The error classification.
    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Byte offset into the source where the failure was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line number of the failure.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column (in characters) of the failure.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// The rendered source window with the caret marker.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Renders the ±2-line source window around `offset` with a caret under the
/// failing column. Returns `(line, column, rendered)`.
fn render_context(src: &str, offset: usize) -> (usize, usize, String) {
    let offset = offset.min(src.len());
    let lines: Vec<&str> = src.split('\n').collect();

    // Locate the failing line by walking line starts. The loop always
    // terminates at the last line because `offset` is clamped to the end of
    // the source, which is the last line's end.
    let mut line_idx = 0;
    let mut line_start = 0;
    let mut scan = 0;
    for (i, l) in lines.iter().enumerate() {
        line_idx = i;
        line_start = scan;
        if offset <= scan + l.len() {
            break;
        }
        scan += l.len() + 1;
    }

    let column = src[line_start..offset].chars().count() + 1;

    let first = line_idx.saturating_sub(2);
    let last = (line_idx + 2).min(lines.len() - 1);
    let width = (last + 1).to_string().len();

    let mut out = String::new();
    for (i, l) in lines.iter().enumerate().take(last + 1).skip(first) {
        out.push_str(&format!("{:>w$} | {}\n", i + 1, l, w = width));
        if i == line_idx {
            out.push_str(&format!(
                "{:>w$} | {}^\n",
                "",
                " ".repeat(column - 1),
                w = width
            ));
        }
    }
    // Drop the trailing newline so the error message does not end blank.
    out.pop();

    (line_idx + 1, column, out)
}

/// A failed typed read of a stored [`Value`](crate::Value).
///
/// Raised by the `get_*` accessors and the `TryFrom` conversions; the
/// variant names the coercion that was attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// The requested key (or index) is not present.
    #[error("missing key `{0}`")]
    Missing(String),
    /// The stored value has a different type than requested.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A float carries fractional data that an integer target would drop.
    #[error("number {0} cannot be narrowed to an integer without loss")]
    FractionalLoss(f64),
    /// The numeric value does not fit the integer target.
    #[error("number {value} is out of range for {target}")]
    OutOfRange { value: f64, target: &'static str },
}

/// Result alias for parse entry points.
pub type Result<T> = std::result::Result<T, ParseError>;
