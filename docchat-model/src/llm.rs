//! The text-completion boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Creativity of the completion; `None` uses the model default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens; `None` uses the model default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
}

/// A single rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Per-request overrides of the client's defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
}

impl LlmRequest {
    /// Create a request with no overrides.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), config: None }
    }

    /// Attach sampling overrides.
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A complete (non-streamed) completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The raw completion text, untrimmed.
    pub text: String,
    /// The model that produced it.
    pub model: String,
}

/// A language model that turns a prompt into a completion.
///
/// A call either returns the full completion or fails; there are no partial
/// results.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    /// Generate a completion for `request`.
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}
