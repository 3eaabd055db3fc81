//! Error types for the parse crate.

/// Errors that can occur while parsing one record.
///
/// None of these abort a document parse; they are reported as diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The header line does not match `--- !u!<code> &<id> [stripped]`.
    #[error("invalid record header: {0:?}")]
    InvalidHeader(String),

    /// The body has no content.
    #[error("record body is empty")]
    EmptyBody,

    /// A line is indented deeper than its context allows.
    #[error("unexpected indentation at body line {line}")]
    UnexpectedIndent { line: usize },

    /// A mapping line has no `key:` prefix.
    #[error("expected `key:` at body line {line}, found {text:?}")]
    ExpectedKey { line: usize, text: String },

    /// A flow collection never closes.
    #[error("unterminated flow collection starting at body line {line}")]
    UnterminatedFlow { line: usize },

    /// A quoted scalar never closes.
    #[error("unterminated quoted scalar starting at body line {line}")]
    UnterminatedQuote { line: usize },

    /// Malformed flow content.
    #[error("malformed flow value at body line {line}: {message}")]
    Flow { line: usize, message: String },
}

/// Convenience alias for parse results.
pub type ParseResult<T> = Result<T, ParseError>;
