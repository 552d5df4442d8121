//! Error types for docchat-model.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling a language model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model server could not be reached
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    /// The request did not complete in time
    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with an error status
    #[error("Model API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The server answered with something that is not a completion
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
