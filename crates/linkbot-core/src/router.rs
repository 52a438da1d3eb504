//! Per-message decision logic: greeting, rejection, or shortening.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    errors::Error,
    events::EventBus,
    messaging::{
        port::MessagingPort,
        types::{InboundMessage, OutboundReply},
    },
    ports::{InboundHandler, Shortener},
    validation::is_valid_url,
    Result,
};

pub const START_COMMAND: &str = "/start";

pub const GREETING_RESPONSE: &str = "Welcome\n\
Send a url like the following url to shortening:\n \
https://www.google.com/images/branding/googlelogo/2x/googlelogo_color_272x92dp.png";

pub const INVALID_URL_RESPONSE: &str = "Invalid url!";

pub const SHORTEN_FAILED_RESPONSE: &str = "Could not shorten this url, try again later.";

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Which branch an inbound text takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Ignore,
    Greeting,
    Rejected,
    Shorten,
}

pub fn classify(text: &str) -> Route {
    if text.is_empty() {
        return Route::Ignore;
    }
    if is_start_command(text) {
        return Route::Greeting;
    }
    if is_valid_url(text) {
        Route::Shorten
    } else {
        Route::Rejected
    }
}

/// `/start`, optionally addressed to a bot (`/start@SomeBot`).
fn is_start_command(text: &str) -> bool {
    if text == START_COMMAND {
        return true;
    }
    text.strip_prefix(START_COMMAND)
        .and_then(|rest| rest.strip_prefix('@'))
        .is_some_and(|bot| !bot.is_empty() && !bot.chars().any(char::is_whitespace))
}

/// Stateless per invocation; safe to share across concurrently running tasks.
pub struct MessageRouter {
    messenger: Arc<dyn MessagingPort>,
    shortener: Arc<dyn Shortener>,
    events: EventBus,
    reply_timeout: Duration,
}

impl MessageRouter {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        shortener: Arc<dyn Shortener>,
        events: EventBus,
    ) -> Self {
        Self {
            messenger,
            shortener,
            events,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Handle one inbound message. Returns the reply that was sent, if any.
    ///
    /// Emits one "received" notification per non-empty text and one "sent"
    /// notification per reply actually delivered.
    pub async fn handle(&self, msg: &InboundMessage) -> Result<Option<OutboundReply>> {
        let route = classify(&msg.text);
        if route == Route::Ignore {
            return Ok(None);
        }

        self.events.message_received(&msg.text);
        tracing::debug!(chat_id = msg.chat_id.0, ?route, "routing inbound message");

        let reply = match route {
            Route::Ignore => return Ok(None),
            Route::Greeting => OutboundReply::to_chat(msg.chat_id, GREETING_RESPONSE),
            Route::Rejected => OutboundReply::replying_to(msg, INVALID_URL_RESPONSE),
            Route::Shorten => self.shortened_reply(msg).await,
        };

        self.send(&reply).await?;
        self.events.message_sent(&reply.text);
        Ok(Some(reply))
    }

    async fn shortened_reply(&self, msg: &InboundMessage) -> OutboundReply {
        match self.shortener.shorten(&msg.text).await {
            Ok(link) => OutboundReply::replying_to(msg, link),
            Err(e) => {
                tracing::warn!(chat_id = msg.chat_id.0, url = %msg.text, "shortening failed: {e}");
                OutboundReply::replying_to(msg, SHORTEN_FAILED_RESPONSE)
            }
        }
    }

    async fn send(&self, reply: &OutboundReply) -> Result<()> {
        match tokio::time::timeout(self.reply_timeout, self.messenger.send_text(reply)).await {
            Ok(sent) => sent.map(|_| ()),
            Err(_) => Err(Error::Timeout(format!(
                "reply to chat {} not sent within {:?}",
                reply.chat_id.0, self.reply_timeout
            ))),
        }
    }
}

#[async_trait]
impl InboundHandler for MessageRouter {
    async fn on_message(&self, msg: InboundMessage) {
        if let Err(e) = self.handle(&msg).await {
            tracing::error!(chat_id = msg.chat_id.0, "failed to reply: {e}");
        }
    }
}


#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::{error::TryRecvError, Receiver};

    use super::testing::{FakeMessenger, FakeShortener};
    use super::*;
    use crate::{
        domain::{ChatId, MessageId},
        events::Notification,
    };

    fn inbound(text: &str, message_id: i32) -> InboundMessage {
        InboundMessage {
            chat_id: ChatId(99),
            message_id: MessageId(message_id),
            text: text.to_string(),
        }
    }

    fn router(
        messenger: Arc<FakeMessenger>,
        shortener: Arc<FakeShortener>,
    ) -> (MessageRouter, Receiver<Notification>) {
        let events = EventBus::new(16);
        let rx = events.subscribe();
        (MessageRouter::new(messenger, shortener, events), rx)
    }

    fn drain(rx: &mut Receiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(n) => out.push(n),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return out,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    fn texts(ns: &[Notification]) -> Vec<(&'static str, String)> {
        ns.iter()
            .map(|n| match n {
                Notification::MessageReceived(e) => ("received", e.message.clone()),
                Notification::MessageSent(e) => ("sent", e.message.clone()),
            })
            .collect()
    }

    #[test]
    fn classifies_texts() {
        assert_eq!(classify(""), Route::Ignore);
        assert_eq!(classify("/start"), Route::Greeting);
        assert_eq!(classify("/start@ShortenerBot"), Route::Greeting);
        assert_eq!(classify("/start@"), Route::Rejected);
        assert_eq!(classify("/start now"), Route::Rejected);
        assert_eq!(classify("/help"), Route::Rejected);
        assert_eq!(classify("not a url"), Route::Rejected);
        assert_eq!(classify("https://a.b/c"), Route::Shorten);
    }

    #[tokio::test]
    async fn start_sends_greeting_without_reply_to() {
        let messenger = Arc::new(FakeMessenger::default());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, mut rx) = router(messenger.clone(), shortener.clone());

        let reply = router.handle(&inbound("/start", 5)).await.unwrap().unwrap();

        assert_eq!(reply.text, GREETING_RESPONSE);
        assert_eq!(reply.reply_to, None);
        assert!(reply.disable_preview);
        assert_eq!(messenger.sent(), vec![reply]);
        assert!(shortener.calls.lock().unwrap().is_empty());
        assert_eq!(
            texts(&drain(&mut rx)),
            vec![
                ("received", "/start".to_string()),
                ("sent", GREETING_RESPONSE.to_string())
            ]
        );
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_as_reply() {
        let messenger = Arc::new(FakeMessenger::default());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, mut rx) = router(messenger.clone(), shortener.clone());

        router.handle(&inbound("not a url", 42)).await.unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, INVALID_URL_RESPONSE);
        assert_eq!(sent[0].reply_to, Some(MessageId(42)));
        assert_eq!(sent[0].chat_id, ChatId(99));
        assert!(shortener.calls.lock().unwrap().is_empty());
        assert_eq!(
            texts(&drain(&mut rx)),
            vec![
                ("received", "not a url".to_string()),
                ("sent", INVALID_URL_RESPONSE.to_string())
            ]
        );
    }

    #[tokio::test]
    async fn valid_url_is_shortened() {
        let messenger = Arc::new(FakeMessenger::default());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/xyz"));
        let (router, mut rx) = router(messenger.clone(), shortener.clone());

        router.handle(&inbound("https://a.b/c", 7)).await.unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "http://yon.ir/xyz");
        assert_eq!(sent[0].reply_to, Some(MessageId(7)));
        assert_eq!(*shortener.calls.lock().unwrap(), vec!["https://a.b/c"]);
        assert_eq!(
            texts(&drain(&mut rx)),
            vec![
                ("received", "https://a.b/c".to_string()),
                ("sent", "http://yon.ir/xyz".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn shortening_failure_becomes_user_visible_reply() {
        let messenger = Arc::new(FakeMessenger::default());
        let shortener = Arc::new(FakeShortener::failing());
        let (router, mut rx) = router(messenger.clone(), shortener);

        let reply = router
            .handle(&inbound("https://example.com/path?q=1", 3))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.text, SHORTEN_FAILED_RESPONSE);
        assert_eq!(reply.reply_to, Some(MessageId(3)));
        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn empty_text_is_ignored() {
        let messenger = Arc::new(FakeMessenger::default());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, mut rx) = router(messenger.clone(), shortener);

        assert_eq!(router.handle(&inbound("", 1)).await.unwrap(), None);
        assert!(messenger.sent().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn failed_send_emits_no_sent_notification() {
        let messenger = Arc::new(FakeMessenger::failing());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, mut rx) = router(messenger, shortener);

        let err = router.handle(&inbound("/start", 1)).await.unwrap_err();
        assert!(matches!(err, Error::External(_)));
        assert_eq!(
            texts(&drain(&mut rx)),
            vec![("received", "/start".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_send_times_out() {
        let messenger = Arc::new(FakeMessenger::slow(Duration::from_secs(30)));
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, _rx) = router(messenger.clone(), shortener);
        let router = router.with_reply_timeout(Duration::from_secs(2));

        let err = router.handle(&inbound("/start", 1)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn handler_swallows_send_errors() {
        let messenger = Arc::new(FakeMessenger::failing());
        let shortener = Arc::new(FakeShortener::returning("http://yon.ir/unused"));
        let (router, _rx) = router(messenger, shortener);

        router.on_message(inbound("hello", 1)).await;
    }
}
