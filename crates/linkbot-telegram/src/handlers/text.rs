use teloxide::types::Message;

use linkbot_core::{
    domain::{ChatId, MessageId},
    messaging::types::InboundMessage,
};

/// Core view of a Telegram message. Non-text messages carry an empty text.
pub fn to_inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        text: msg.text().unwrap_or_default().to_string(),
    }
}
