//! Error types for parsing and loading documents.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// What went wrong during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// `<!` not followed by `--`, a comment running into end of input, or a
    /// nested `<!--` before the closing `-->`.
    #[error("invalid comment format")]
    MalformedComment,

    /// A closing tag that does not match the innermost open tag.
    #[error("tag mismatch: (<{}></{found}>)", .expected.as_deref().unwrap_or(""))]
    TagMismatch {
        /// Tag of the innermost open node (`None` at top level).
        expected: Option<String>,
        /// Name read from the closing tag.
        found: String,
    },

    /// Text left over at end of input with no tag to hold it.
    #[error("text out of tag: ({text})")]
    TextOutsideElement {
        /// The offending text, as written.
        text: String,
    },

    /// Empty tag name, a name starting with punctuation or a digit, or a name
    /// using the reserved `xml` prefix.
    #[error("invalid tag: <{header}>")]
    InvalidTag {
        /// Raw text between `<` and `>`.
        header: String,
    },

    /// A `<?...` header that does not end with `?`.
    #[error("invalid processing instruction: <{header}>")]
    MalformedProcessingInstruction {
        /// Raw text between `<` and `>`.
        header: String,
    },

    /// An attribute key not directly followed by `=`.
    #[error("bad key:value format")]
    BadAttributeKey,

    /// An attribute value whose closing quote is missing.
    #[error("bad value format")]
    BadAttributeValue,

    /// A `<` with no `>` after it.
    #[error("unterminated tag")]
    UnterminatedTag,
}

/// A fatal parse failure and the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at({position})")]
pub struct ParseError {
    /// Failure kind.
    pub kind: ErrorKind,
    /// Byte offset into the input.
    pub position: usize,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// Errors from [`load`](crate::load).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read '{}'", .path.display())]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file was read but did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
