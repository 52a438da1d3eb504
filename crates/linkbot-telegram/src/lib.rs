//! Telegram adapter (teloxide).
//!
//! This crate implements the `linkbot-core` messaging and transport ports over
//! the Telegram Bot API.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod dispatch;
pub mod handlers;

pub use dispatch::{TelegramConnector, TelegramTransport};

use linkbot_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::OutboundReply},
    Result,
};

/// Errors produced by the Telegram adapter.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("teloxide error: {0}")]
    Teloxide(#[from] teloxide::RequestError),

    #[error("no bot token configured")]
    NoToken,
}

impl From<TelegramError> for Error {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::NoToken => Error::Config(e.to_string()),
            TelegramError::Teloxide(e) => Error::External(format!("telegram error: {e}")),
        }
    }
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, reply: &OutboundReply) -> Result<MessageRef> {
        // Plain text: no parse mode.
        let mut req = self
            .bot
            .send_message(Self::tg_chat(reply.chat_id), reply.text.clone())
            .disable_web_page_preview(reply.disable_preview);
        if let Some(id) = reply.reply_to {
            req = req.reply_to_message_id(Self::tg_msg_id(id));
        }

        let msg = req.await.map_err(TelegramError::from)?;

        Ok(MessageRef {
            chat_id: reply.chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
