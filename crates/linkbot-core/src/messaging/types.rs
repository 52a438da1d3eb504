use crate::domain::{ChatId, MessageId};

/// A text message delivered by the messaging transport.
///
/// Non-text updates arrive with an empty `text` and are ignored by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

/// A plain-text reply produced by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub disable_preview: bool,
}

impl OutboundReply {
    /// Standalone message in `chat_id`.
    pub fn to_chat(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
            disable_preview: true,
        }
    }

    /// Reply quoting the inbound message.
    pub fn replying_to(msg: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            chat_id: msg.chat_id,
            text: text.into(),
            reply_to: Some(msg.message_id),
            disable_preview: true,
        }
    }
}
