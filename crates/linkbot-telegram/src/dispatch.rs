//! Long-polling transport with start/stop control.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{
    dispatching::{Dispatcher, ShutdownToken},
    dptree,
    prelude::*,
};
use tokio::{sync::Mutex, task::JoinHandle};

use linkbot_core::{
    errors::Error,
    messaging::port::MessagingPort,
    ports::{Connector, InboundHandler, Transport},
    Result,
};

use crate::{handlers, TelegramError, TelegramMessenger};

/// Builds a [`TelegramTransport`] from a bot token.
#[derive(Clone, Copy, Debug, Default)]
pub struct TelegramConnector;

impl Connector for TelegramConnector {
    fn connect(&self, credential: &str) -> Result<Arc<dyn Transport>> {
        let token = credential.trim();
        if token.is_empty() {
            return Err(TelegramError::NoToken.into());
        }
        Ok(Arc::new(TelegramTransport::new(Bot::new(token))))
    }
}

struct Polling {
    shutdown: ShutdownToken,
    task: JoinHandle<()>,
}

pub struct TelegramTransport {
    bot: Bot,
    messenger: Arc<TelegramMessenger>,
    polling: Mutex<Option<Polling>>,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self {
            messenger: Arc::new(TelegramMessenger::new(bot.clone())),
            bot,
            polling: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn messenger(&self) -> Arc<dyn MessagingPort> {
        self.messenger.clone()
    }

    async fn start_receiving(&self, handler: Arc<dyn InboundHandler>) -> Result<()> {
        let mut polling = self.polling.lock().await;
        if polling.is_some() {
            return Err(Error::Usage("telegram polling is already running".to_string()));
        }

        // Fails fast on a bad token instead of inside the polling loop.
        let me = self.bot.get_me().await.map_err(TelegramError::from)?;
        tracing::info!("polling telegram as @{}", me.username());

        let schema = Update::filter_message().endpoint(handlers::handle_message);
        let mut dispatcher = Dispatcher::builder(self.bot.clone(), schema)
            .dependencies(dptree::deps![handler])
            .default_handler(|_| async {})
            .build();

        let shutdown = dispatcher.shutdown_token();
        let task = tokio::spawn(async move { dispatcher.dispatch().await });
        *polling = Some(Polling { shutdown, task });
        Ok(())
    }

    async fn stop_receiving(&self) -> Result<()> {
        let Some(polling) = self.polling.lock().await.take() else {
            return Ok(());
        };

        match polling.shutdown.shutdown() {
            Ok(done) => done.await,
            // Dispatcher has not entered its loop yet.
            Err(_) => polling.task.abort(),
        }

        match polling.task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::warn!("telegram polling task failed: {e}"),
        }
        tracing::info!("telegram polling stopped");
        Ok(())
    }
}
