use std::fmt;

use serde::{Deserialize, Serialize};

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
///
/// Serialized as `{"role": "user", "text": "..."}`. Older transcripts that
/// used a `content` key are still accepted. Assistant turns reporting a failed
/// exchange carry `"diagnostic": true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(alias = "content")]
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub diagnostic: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, text: text.into(), diagnostic: false }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// An assistant turn standing in for a reply that could not be produced.
    pub fn diagnostic(text: impl Into<String>) -> Self {
        Self { diagnostic: true, ..Self::assistant(text) }
    }
}

/// Ordered record of a conversation's turns.
pub type Transcript = Vec<ConversationTurn>;
