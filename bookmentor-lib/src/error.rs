//! Error types for bookmentor

use std::fmt;

use thiserror::Error;

/// Result type alias for bookmentor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a document produced no text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    /// The bytes could not be parsed as the expected format
    Malformed,
    /// The document parsed but holds no extractable text
    Empty,
}

impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionKind::Malformed => f.write_str("malformed document"),
            ExtractionKind::Empty => f.write_str("no extractable text"),
        }
    }
}

/// Errors that can occur in bookmentor operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to turn a source document into text
    #[error("extraction error ({kind}): {message}")]
    Extraction {
        kind: ExtractionKind,
        message: String,
    },

    /// Chunking produced nothing to index
    #[error("chunking produced no chunks")]
    EmptyChunks,

    /// Vectors in one index (or a query) disagree on dimension
    #[error("dimension mismatch at position {position}: expected {expected}, got {actual}")]
    Dimension {
        expected: usize,
        actual: usize,
        position: usize,
    },

    /// An index was built from, or searched with, no vectors
    #[error("index has no vectors")]
    EmptyIndex,

    /// The embedding model failed; safe to retry
    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("config error: {0}")]
    Config(String),

    /// A blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::Extraction {
            kind: ExtractionKind::Malformed,
            message: message.into(),
        }
    }

    pub(crate) fn empty_document(message: impl Into<String>) -> Self {
        Error::Extraction {
            kind: ExtractionKind::Empty,
            message: message.into(),
        }
    }

    /// Returns `true` for failures that may succeed if the call is repeated.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::EmbeddingProvider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_provider_errors_are_transient() {
        assert!(Error::EmbeddingProvider("timeout".into()).is_transient());
        assert!(!Error::EmptyChunks.is_transient());
        assert!(!Error::malformed("bad xref").is_transient());
    }

    #[test]
    fn test_extraction_message_names_kind() {
        let err = Error::empty_document("3 pages, no text");
        assert_eq!(
            err.to_string(),
            "extraction error (no extractable text): 3 pages, no text"
        );
    }
}
