//! Unbounded event queue between a session and its renderer

use super::events::SessionEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Event bus that decouples the chat session from whatever renders it
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: Arc<Mutex<Option<EventReceiver>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Take the receiver (can only be called once)
    pub fn take_receiver(&self) -> Option<EventReceiver> {
        self.rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Publish an event
    pub fn publish(&self, event: SessionEvent) -> crate::Result<()> {
        self.tx
            .send(event)
            .map_err(|_| crate::Error::Bus("Event receiver dropped".to_string()))
    }

    /// Whether a renderer has taken the receiver
    pub fn is_attached(&self) -> bool {
        self.rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }

    /// Publish an event if a renderer is attached, ignoring a dropped receiver.
    /// Events emitted before `take_receiver` are discarded, not queued.
    pub fn emit(&self, event: SessionEvent) {
        if !self.is_attached() {
            return;
        }
        if let Err(e) = self.publish(event) {
            debug!("Event not delivered: {}", e);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
