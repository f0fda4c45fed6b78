//! Conversation log data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lowercase wire name ("user", "assistant")
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized speaker label used in transcripts ("User", "Assistant")
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered, append-only log of turns.
///
/// The only way to remove turns is [`ConversationLog::reset`], which drops
/// everything and optionally re-seeds the assistant greeting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    greeting: Option<String>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log whose first turn is an assistant greeting.
    /// The greeting is restored on every reset.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            turns: vec![Turn::assistant(greeting.clone())],
            greeting: Some(greeting),
        }
    }

    /// Append a turn and return its index
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// Append a user turn and return its index
    pub fn push_user(&mut self, content: impl Into<String>) -> usize {
        self.push(Turn::user(content))
    }

    /// Append an assistant turn and return its index
    pub fn push_assistant(&mut self, content: impl Into<String>) -> usize {
        self.push(Turn::assistant(content))
    }

    /// All turns in insertion order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turn at `index`
    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The trailing `n` turns (all of them if fewer exist)
    pub fn tail(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Whether a reset restores a greeting
    pub fn is_seeded(&self) -> bool {
        self.greeting.is_some()
    }

    /// Number of turns by `role`
    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// Drop every turn, restoring the greeting if the log was seeded
    pub fn reset(&mut self) {
        self.turns.clear();
        if let Some(greeting) = &self.greeting {
            self.turns.push(Turn::assistant(greeting.clone()));
        }
    }
}
