use std::time::Duration;

/// Default number of chunks retrieved per turn.
pub const DEFAULT_TOP_K: usize = 3;

/// Default number of prior turns rendered into the prompt.
pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// Default bound on a single model call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Knobs for [`ConversationEngine`](crate::ConversationEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Chunks retrieved per turn
    pub top_k: usize,
    /// Prior turns kept in the prompt window; 0 disables short-term memory
    pub history_turns: usize,
    /// A model call running longer than this is a failed turn
    pub generation_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            history_turns: DEFAULT_HISTORY_TURNS,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_history_turns(mut self, history_turns: usize) -> Self {
        self.history_turns = history_turns;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}
