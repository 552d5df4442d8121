//! Error types for the `docchat-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, persisting or querying the index.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single corpus document could not be read or decoded.
    #[error("Corpus error ({document}): {message}")]
    CorpusError {
        /// Identifier of the document that failed (usually a path).
        document: String,
        /// A description of the failure.
        message: String,
    },

    /// A persisted index exists but cannot be trusted.
    #[error("Corrupt index at {}: {message}", path.display())]
    CorruptIndex {
        /// The persistence directory.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// A persisted index was produced under different settings.
    #[error("Incompatible index: {field} is {found}, expected {expected}")]
    IncompatibleIndex {
        /// The manifest field that disagreed.
        field: &'static str,
        /// The value this store expects.
        expected: String,
        /// The value recorded in the manifest.
        found: String,
    },

    /// A vector did not have the dimensionality of the index.
    #[error("Dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch {
        /// Dimensionality of the index.
        expected: usize,
        /// Dimensionality of the offending vector.
        found: usize,
    },

    /// Writing or removing persisted state failed.
    #[error("Persistence error at {}: {source}", path.display())]
    PersistenceError {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RagError {
    /// Whether this error describes a persisted index that should be rebuilt.
    pub fn is_index_fault(&self) -> bool {
        matches!(
            self,
            Self::CorruptIndex { .. } | Self::IncompatibleIndex { .. } | Self::DimensionMismatch { .. }
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
