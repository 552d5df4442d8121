use std::time::Duration;

use docchat_model::ModelError;
use docchat_rag::RagError;
use docchat_session::SessionError;
use thiserror::Error;

/// Failure of one stage of a conversational turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("the language model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("transcript error: {0}")]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, ChatError>;
