use async_trait::async_trait;

use crate::{domain::MessageRef, messaging::types::OutboundReply, Result};

/// Outbound side of a messenger.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send `reply` as plain text. Returns a reference to the sent message.
    async fn send_text(&self, reply: &OutboundReply) -> Result<MessageRef>;
}
