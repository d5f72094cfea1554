//! Error types for the `similarity-search` crate.

use thiserror::Error;

/// Errors that can occur while indexing, searching, or persisting.
///
/// Variants fall into two groups. Configuration-fatal errors mean an index
/// invariant would be broken if the operation went ahead; see
/// [`SearchError::is_fatal`]. Everything else is an I/O or backend failure
/// that the caller may retry or report.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The embedder failed to produce a vector for a piece of text.
    #[error("Embedding error ({embedder}): {message}")]
    Embedding {
        /// The embedder that produced the error.
        embedder: String,
        /// A description of the failure.
        message: String,
    },

    /// The probe encode at construction time did not yield a usable vector.
    #[error("Dimension discovery failed: {0}")]
    DimensionDiscovery(String),

    /// An embedding did not have the index dimension.
    #[error("Dimension mismatch, expected {expected}, saw {actual}")]
    DimensionMismatch {
        /// The dimension fixed at index construction.
        expected: usize,
        /// The length of the offending embedding.
        actual: usize,
    },

    /// Parallel input sequences to a batch operation had different lengths.
    #[error("Input length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which input sequence was wrong.
        what: &'static str,
        /// The length of the `ids` sequence.
        expected: usize,
        /// The length of the offending sequence.
        actual: usize,
    },

    /// The tokenizer vocabulary is missing a token it was asked about.
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A vector store could not encode or decode an index file.
    #[error("Vector store error ({backend}): {message}")]
    Store {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An I/O error while reading or writing index files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON encoding or decoding error.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Returns `true` for errors that signal a broken invariant rather than
    /// a transient failure. Callers should not keep using an index after
    /// ignoring one of these.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SearchError::DimensionDiscovery(_)
                | SearchError::DimensionMismatch { .. }
                | SearchError::LengthMismatch { .. }
                | SearchError::Vocabulary(_)
                | SearchError::Config(_)
        )
    }

    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        SearchError::Store { backend: backend.to_string(), message: message.into() }
    }
}

/// A convenience result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
