//! # docchat-agent
//!
//! Retrieval-augmented conversation.
//!
//! [`ConversationEngine`] turns user text into an answer: it searches the
//! [`DocumentStore`](docchat_rag::DocumentStore), renders the fixed prompt
//! template around the retrieved context and recent turns, and asks an
//! [`Llm`](docchat_model::Llm) for a completion. [`ChatSession`] binds an
//! engine to a durable transcript.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_agent::{ChatSession, ConversationEngine};
//! use docchat_session::SessionMemory;
//!
//! let engine = ConversationEngine::new(store, Arc::new(model));
//! let mut session = ChatSession::new(engine, SessionMemory::restore("chat_history.json"));
//! println!("{}", session.send("How many countries does VisaBridge support?").await);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod session;

pub use config::EngineConfig;
pub use engine::{ConversationEngine, DIAGNOSTIC_PREFIX};
pub use error::{ChatError, Result};
pub use prompt::{SYSTEM_FRAMING, render_prompt};
pub use session::ChatSession;
