//! Chat notifications for external observers (console log, UI, ...).
//!
//! Backed by a `tokio::sync::broadcast` channel: publishing never blocks the
//! dispatch path and nobody listening is not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Notification payload: the text that was received or sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatEvent {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum Notification {
    MessageReceived(ChatEvent),
    MessageSent(ChatEvent),
}

#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Notification>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns the number of subscribers that got the notification.
    pub fn publish(&self, notification: Notification) -> usize {
        self.tx.send(notification).unwrap_or(0)
    }

    pub fn message_received(&self, text: &str) -> usize {
        self.publish(Notification::MessageReceived(ChatEvent::new(text)))
    }

    pub fn message_sent(&self, text: &str) -> usize {
        self.publish(Notification::MessageSent(ChatEvent::new(text)))
    }

    /// Receiver for all notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
