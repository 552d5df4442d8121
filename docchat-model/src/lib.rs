//! # docchat-model
//!
//! The language-model boundary for docchat.
//!
//! ## Overview
//!
//! This crate defines the [`Llm`] trait, a single prompt-in, completion-out
//! call, and provides:
//!
//! - [`OllamaModel`] - a local Ollama server via `/api/generate`
//! - [`MockLlm`] - a scripted model for tests and offline runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docchat_model::{Llm, LlmRequest, OllamaConfig, OllamaModel};
//!
//! let model = OllamaModel::new(OllamaConfig::new("llama3"))?;
//! let reply = model.generate(LlmRequest::new("Say hello.")).await?;
//! println!("{}", reply.text.trim());
//! ```
//!
//! ## Features
//!
//! - `ollama` (default) - the reqwest-based Ollama client

pub mod error;
pub mod llm;
pub mod mock;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use error::{ModelError, Result};
pub use llm::{GenerationConfig, Llm, LlmRequest, LlmResponse};
pub use mock::MockLlm;
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaModel};
