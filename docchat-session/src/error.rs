use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing a transcript file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Transcript I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transcript at {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
