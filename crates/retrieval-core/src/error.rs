//! Error types for the retrieval engine.

use thiserror::Error;

/// Result type alias using RetrievalError.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval engine.
///
/// "No results" is never an error: searching an empty corpus, or a query
/// that matches nothing, returns an empty success value.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// An embedding has the wrong length for its corpus or index.
    /// Never silently truncated or padded.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid argument provided (zero top_k, negative weight, ...).
    /// Validated before any computation starts.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A document with this id is already present in the corpus.
    #[error("Duplicate document id: {id}")]
    DuplicateId { id: String },

    /// The query's cancellation token was tripped mid-scan.
    #[error("Search cancelled")]
    Cancelled,

    /// Embedding provider error.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RetrievalError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
