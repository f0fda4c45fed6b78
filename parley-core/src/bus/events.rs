//! Event types for the session bus

use serde::{Deserialize, Serialize};

use crate::session::{SessionState, Turn};

/// Something a chat session did that a renderer may want to show
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to a new state
    StateChanged {
        session_id: String,
        state: SessionState,
    },
    /// A turn was appended at `index`
    TurnAppended {
        session_id: String,
        index: usize,
        turn: Turn,
    },
    /// The auto-summarize trigger fired and produced a digest
    SummaryReady {
        session_id: String,
        log_len: usize,
        summary: String,
    },
    /// The auto-summarize trigger fired but the summarizer failed
    SummaryFailed {
        session_id: String,
        log_len: usize,
        error: String,
    },
    /// The response cache was wiped because the model changed
    CacheInvalidated {
        session_id: String,
        entries: usize,
        model: String,
    },
    /// The conversation was reset
    ConversationCleared { session_id: String, log_len: usize },
}

impl SessionEvent {
    /// The session this event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::StateChanged { session_id, .. }
            | SessionEvent::TurnAppended { session_id, .. }
            | SessionEvent::SummaryReady { session_id, .. }
            | SessionEvent::SummaryFailed { session_id, .. }
            | SessionEvent::CacheInvalidated { session_id, .. }
            | SessionEvent::ConversationCleared { session_id, .. } => session_id,
        }
    }
}
