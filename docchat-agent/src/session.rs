use docchat_rag::LoadOutcome;
use docchat_session::{ConversationTurn, SessionMemory};
use tracing::{info, warn};

use crate::engine::ConversationEngine;
use crate::error::Result;

/// Everything one conversation needs, built once and passed to each handler.
///
/// The session owns the engine and the transcript. Every exchange is appended
/// and persisted before `send` returns.
pub struct ChatSession {
    engine: ConversationEngine,
    memory: SessionMemory,
}

impl ChatSession {
    /// Bind `engine` to `memory`, seeding the engine's short-term memory from
    /// the stored transcript.
    pub fn new(mut engine: ConversationEngine, memory: SessionMemory) -> Self {
        if !memory.is_empty() {
            engine.restore_history(memory.all());
            info!(turns = memory.len(), "resumed conversation");
        }
        Self { engine, memory }
    }

    /// Run one exchange and record it.
    ///
    /// A persistence failure is logged; the in-memory transcript keeps the
    /// exchange either way.
    pub async fn send(&mut self, user_text: &str) -> String {
        let reply = self.engine.respond_turn(user_text).await;
        let text = reply.text.clone();
        self.memory.append(ConversationTurn::user(user_text));
        self.memory.append(reply);
        if let Err(e) = self.memory.persist() {
            warn!(error = %e, "failed to persist transcript");
        }
        text
    }

    /// Forget the conversation: transcript, its file, and short-term memory.
    pub fn clear(&mut self) -> Result<()> {
        self.engine.clear_history();
        self.memory.clear()?;
        Ok(())
    }

    /// Re-read the corpus and rebuild the index from scratch.
    pub async fn reindex(&self) -> Result<LoadOutcome> {
        Ok(self.engine.store().rebuild().await?)
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        self.memory.all()
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }
}
