//! Chat session states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a chat session is in its submit/respond cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for user input
    #[default]
    Idle,
    /// A user turn was recorded and a completion is in flight
    AwaitingResponse,
    /// The assistant turn was recorded; the summarize check is pending
    ResponseReady,
    /// The last completion failed. The user turn is kept and input is accepted again.
    Failed { reason: String },
}

impl SessionState {
    /// Whether a new user submission is allowed in this state
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Failed { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingResponse => write!(f, "awaiting response"),
            SessionState::ResponseReady => write!(f, "response ready"),
            SessionState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
