//! Ollama client implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::config::OllamaConfig;
use crate::error::{ModelError, Result};
use crate::llm::{Llm, LlmRequest, LlmResponse};

/// Client for the Ollama `/api/generate` endpoint.
///
/// Requests are sent with `stream: false`, so each call yields one complete
/// completion or an error.
pub struct OllamaModel {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaModel {
    /// Create a new Ollama client.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(ModelError::InvalidConfig("model name must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn options(&self, request: &LlmRequest) -> GenerateOptions {
        let overrides = request.config.as_ref();
        GenerateOptions {
            temperature: overrides.and_then(|c| c.temperature).or(self.config.temperature),
            num_predict: overrides.and_then(|c| c.max_output_tokens).or(self.config.max_tokens),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.config.timeout)
        } else {
            ModelError::Unavailable(format!("{}: {e}", self.config.base_url))
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl Llm for OllamaModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        debug!(model = %self.config.model, prompt_len = request.prompt.len(), "generating completion");

        let body = GenerateRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            stream: false,
            options: self.options(&request),
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.config.model, error = %e, "request failed");
                self.map_send_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message =
                serde_json::from_str::<ErrorResponse>(&text).map(|e| e.error).unwrap_or(text);
            error!(model = %self.config.model, %status, "API error");
            return Err(ModelError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                return ModelError::Timeout(self.config.timeout);
            }
            error!(model = %self.config.model, error = %e, "failed to parse response");
            ModelError::InvalidResponse(e.to_string())
        })?;

        Ok(LlmResponse {
            text: parsed.response,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }
}
