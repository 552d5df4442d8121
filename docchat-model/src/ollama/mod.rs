//! Ollama provider for locally served models.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_model::ollama::{OllamaConfig, OllamaModel};
//!
//! let model = OllamaModel::new(
//!     OllamaConfig::new("llama3")
//!         .with_base_url("http://localhost:11434")
//!         .with_temperature(0.7),
//! )?;
//! ```

mod client;
mod config;

pub use client::OllamaModel;
pub use config::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, OLLAMA_BASE_URL, OllamaConfig};
