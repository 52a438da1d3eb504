use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    messaging::{port::MessagingPort, types::InboundMessage},
    Result,
};

/// Maps a long URL to a public short link.
#[async_trait]
pub trait Shortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String>;
}

/// Receives every inbound message the transport delivers.
///
/// Called once per message, possibly concurrently from many tasks.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn on_message(&self, msg: InboundMessage);
}

/// A bound messaging transport (one bot credential).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Outbound client bound to the same credential.
    fn messenger(&self) -> Arc<dyn MessagingPort>;

    /// Begin delivering inbound messages to `handler`. Must not block until shutdown.
    async fn start_receiving(&self, handler: Arc<dyn InboundHandler>) -> Result<()>;

    /// Stop delivering new inbound messages. Replies already in flight are left alone.
    async fn stop_receiving(&self) -> Result<()>;
}

/// Builds a [`Transport`] from a bot credential.
pub trait Connector: Send + Sync {
    fn connect(&self, credential: &str) -> Result<Arc<dyn Transport>>;
}
