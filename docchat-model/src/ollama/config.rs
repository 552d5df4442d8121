//! Configuration for the Ollama client.

use std::time::Duration;

/// Default Ollama server address.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "llama3";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default bound on a single completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for [`OllamaModel`](super::OllamaModel).
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    /// Model name as known to the Ollama server
    pub model: String,
    /// Server address without a trailing slash
    pub base_url: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<i32>,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl OllamaConfig {
    /// Create a config for `model` on the default local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: OLLAMA_BASE_URL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the server address
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max_tokens
    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
