//! Telegram update handlers.
//!
//! Each inbound message is converted to the core model and handed to the
//! registered handler on its own task, so a slow reply never holds up polling.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use linkbot_core::ports::InboundHandler;

mod text;

pub use text::to_inbound;

pub async fn handle_message(msg: Message, inbound: Arc<dyn InboundHandler>) -> ResponseResult<()> {
    let msg = to_inbound(&msg);
    tokio::spawn(async move {
        inbound.on_message(msg).await;
    });
    Ok(())
}
