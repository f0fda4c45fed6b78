//! Conversation state for a chat session
//!
//! The log is in-memory only and lives as long as the session that owns it.

pub mod policy;
pub mod state;
pub mod store;

pub use policy::{AutoSummarizePolicy, SummaryTrigger};
pub use state::SessionState;
pub use store::{ConversationLog, Role, Turn};
