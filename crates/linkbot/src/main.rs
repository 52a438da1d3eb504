use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use linkbot_core::{
    config::Config,
    events::{EventBus, Notification},
    session::BotSession,
};
use linkbot_telegram::TelegramConnector;
use linkbot_yon::YonClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linkbot_core::logging::init("linkbot")?;

    let cfg = Config::load()?;
    let shortener = Arc::new(YonClient::from_config(&cfg)?);

    let session = BotSession::new(
        Arc::new(TelegramConnector),
        shortener,
        EventBus::new(cfg.event_buffer),
    )
    .with_reply_timeout(cfg.reply_timeout);

    let log_task = tokio::spawn(log_chat_events(session.subscribe()));

    session
        .initialize(&cfg.telegram_bot_token)
        .await
        .context("failed to initialize bot")?;
    session.start().await.context("failed to start bot")?;
    tracing::info!("shortener: {}", cfg.shortener_api_url);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    session.stop().await.context("failed to stop bot")?;
    drop(session);
    if let Err(e) = log_task.await {
        tracing::warn!("chat log task failed: {e}");
    }

    Ok(())
}

/// Console stand-in for a chat log window.
async fn log_chat_events(mut rx: Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(Notification::MessageReceived(e)) => tracing::info!("Received message: {}", e.message),
            Ok(Notification::MessageSent(e)) => tracing::info!("Bot response: {}", e.message),
            Err(RecvError::Lagged(n)) => tracing::warn!("chat log skipped {n} events"),
            Err(RecvError::Closed) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn chat_log_ends_when_the_bus_is_dropped() {
        let bus = EventBus::new(8);
        let task = tokio::spawn(log_chat_events(bus.subscribe()));

        bus.message_received("https://a.b/c");
        bus.message_sent("http://yon.ir/xyz");
        drop(bus);

        let joined = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("chat log did not stop");
        assert!(joined.is_ok());
    }
}
