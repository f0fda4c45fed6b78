//! Session event bus
//!
//! The chat session publishes what happened to it here; a renderer drains
//! the receiver and draws. The session never calls into the renderer.

pub mod events;
pub mod queue;

pub use events::SessionEvent;
pub use queue::{EventBus, EventReceiver};
