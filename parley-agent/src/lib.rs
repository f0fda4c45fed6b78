//! Conversation layer for parley
//!
//! [`ChatSession`] runs the submit/respond cycle over a conversation log,
//! fires periodic summaries and caches backend responses. [`Selector`] maps
//! user choices to system prompts and model ids. The one-shot generators in
//! [`generate`] reuse the same providers without a conversation.

pub mod chat;
pub mod context;
pub mod generate;
pub mod selector;

pub use chat::{ChatSession, ConversationStats, Exchange, SessionConfig, SessionOptions};
pub use context::{build_chat_prompt, render_history, ModeCatalog, DEFAULT_MODE};
pub use generate::{Answer, Asker, PostGenerator, PostRequest, Tone};
pub use selector::Selector;
