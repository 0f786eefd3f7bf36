//! Conversation session state
//!
//! One practice session per process. The history is an append-only list of
//! turns that is cleared when a new session starts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Speaker label used when rendering history into a prompt
    #[must_use]
    pub const fn speaker(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Model => "AI",
        }
    }
}

/// One utterance in the dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered history of turns for the current practice session
#[derive(Debug, Default)]
pub struct ConversationSession {
    turns: Vec<Turn>,
}

impl ConversationSession {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Drop every turn
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Add a turn at the end of the history
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(Turn::new(role, text));
    }

    /// Current history in append order
    #[must_use]
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Session shared between request handlers
///
/// A single lock guards reset, append and snapshot so concurrent cycles
/// cannot interleave their turns.
pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// Create an empty shared session
#[must_use]
pub fn shared_session() -> SharedSession {
    Arc::new(Mutex::new(ConversationSession::new()))
}
