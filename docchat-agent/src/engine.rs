//! Retrieve, prompt, generate.

use std::sync::Arc;

use docchat_model::{Llm, LlmRequest};
use docchat_rag::DocumentStore;
use docchat_session::{ConversationTurn, Role};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{ChatError, Result};
use crate::prompt::{context_block, render_prompt};

/// Prefix of the assistant text produced for a failed turn.
pub const DIAGNOSTIC_PREFIX: &str = "An error occurred: ";

/// Answers user text using retrieved document context and a language model.
///
/// The engine keeps a short window of prior successful exchanges and feeds
/// them back into each prompt. Failed turns never enter that window.
pub struct ConversationEngine {
    store: Arc<DocumentStore>,
    llm: Arc<dyn Llm>,
    config: EngineConfig,
    history: Vec<ConversationTurn>,
}

impl ConversationEngine {
    pub fn new(store: Arc<DocumentStore>, llm: Arc<dyn Llm>) -> Self {
        Self { store, llm, config: EngineConfig::default(), history: Vec::new() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self.trim_history();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// The turns currently rendered into prompts, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Answer `user_text`, always producing some text.
    ///
    /// Failures are logged and turned into a diagnostic starting with
    /// [`DIAGNOSTIC_PREFIX`].
    pub async fn respond(&mut self, user_text: &str) -> String {
        self.respond_turn(user_text).await.text
    }

    /// Like [`respond`](Self::respond), returning the assistant turn so a
    /// failed exchange can be recorded as a diagnostic.
    pub async fn respond_turn(&mut self, user_text: &str) -> ConversationTurn {
        match self.try_respond(user_text).await {
            Ok(reply) => ConversationTurn::assistant(reply),
            Err(e) => {
                error!(error = %e, "turn failed");
                ConversationTurn::diagnostic(format!("{DIAGNOSTIC_PREFIX}{e}"))
            }
        }
    }

    /// Answer `user_text`, surfacing generation failures as typed errors.
    ///
    /// Retrieval failures do not fail the turn; the prompt is rendered with an
    /// empty context block instead.
    pub async fn try_respond(&mut self, user_text: &str) -> Result<String> {
        let context = match self.retrieve_context(user_text).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without document context");
                String::new()
            }
        };

        let prompt = render_prompt(&context, &self.history, user_text);
        debug!(prompt_len = prompt.len(), history = self.history.len(), "rendered prompt");

        let timeout = self.config.generation_timeout;
        let response = tokio::time::timeout(timeout, self.llm.generate(LlmRequest::new(prompt)))
            .await
            .map_err(|_| ChatError::Timeout(timeout))??;

        let reply = response.text.trim().to_string();
        info!(model = %response.model, reply_len = reply.len(), "generated reply");

        self.remember(ConversationTurn::user(user_text));
        self.remember(ConversationTurn::assistant(reply.clone()));
        Ok(reply)
    }

    /// The newline-joined texts of the top-ranked chunks for `user_text`.
    pub async fn retrieve_context(&self, user_text: &str) -> Result<String> {
        let results = self.store.search_top_k(user_text, self.config.top_k).await?;
        debug!(chunk_count = results.len(), "retrieved context");
        Ok(context_block(results.iter().map(|r| r.chunk.text.as_str())))
    }

    /// Seed short-term memory from a stored transcript without calling the
    /// model.
    ///
    /// Diagnostic turns are skipped together with the user turn that
    /// prompted them.
    pub fn restore_history(&mut self, transcript: &[ConversationTurn]) {
        self.history.clear();
        for turn in transcript {
            if turn.diagnostic {
                if self.history.last().is_some_and(|t| t.role == Role::User) {
                    self.history.pop();
                }
                continue;
            }
            self.history.push(turn.clone());
        }
        self.trim_history();
        debug!(turns = self.history.len(), "restored conversational memory");
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn remember(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
        self.trim_history();
    }

    /// Drop the oldest turns beyond the window, never leaving an assistant
    /// turn without the user turn before it.
    fn trim_history(&mut self) {
        let mut excess = self.history.len().saturating_sub(self.config.history_turns);
        while self.history.get(excess).is_some_and(|t| t.role == Role::Assistant) {
            excess += 1;
        }
        self.history.drain(..excess);
    }
}
