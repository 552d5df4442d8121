//! Ollama embedding provider using the local `/api/embed` endpoint.
//!
//! This module is only available when the `ollama` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default embedding model.
pub const DEFAULT_MODEL: &str = "all-minilm";

/// The dimensionality of `all-minilm`.
pub const DEFAULT_DIMENSIONS: usize = 384;

const PROVIDER: &str = "Ollama";

/// An [`EmbeddingProvider`] backed by a local Ollama server.
///
/// # Configuration
///
/// - `model` – defaults to `all-minilm`.
/// - `dimensions` – must match the model; every response is checked against it.
/// - `base_url` – defaults to `http://localhost:11434`.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new()?
///     .with_model("nomic-embed-text", 768);
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for `all-minilm` on the default local server.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(60))
    }

    /// Create a provider whose HTTP requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Set the server address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name and the dimensionality it produces.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: PROVIDER.into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbedRequest { model: &self.model, input: texts.to_vec() };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: PROVIDER.into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if let Some(bad) = embed_response.embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(RagError::DimensionMismatch { expected: self.dimensions, found: bad.len() });
        }

        Ok(embed_response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
