//! Bot session lifecycle: Uninitialized -> Ready <-> Receiving.

use std::{sync::Arc, time::Duration};

use tokio::sync::{broadcast, Mutex};

use crate::{
    errors::Error,
    events::{EventBus, Notification},
    ports::{Connector, Shortener, Transport},
    router::MessageRouter,
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    Receiving,
}

#[derive(Clone)]
struct Bound {
    transport: Arc<dyn Transport>,
    router: Arc<MessageRouter>,
}

enum State {
    Uninitialized,
    Ready(Bound),
    Receiving(Bound),
}

impl State {
    fn status(&self) -> SessionStatus {
        match self {
            State::Uninitialized => SessionStatus::Uninitialized,
            State::Ready(_) => SessionStatus::Ready,
            State::Receiving(_) => SessionStatus::Receiving,
        }
    }
}

/// Owns the transport and wires inbound messages to a [`MessageRouter`].
///
/// Notifications are available through [`BotSession::subscribe`] in every state,
/// so observers can attach before the bot is initialized.
pub struct BotSession {
    connector: Arc<dyn Connector>,
    shortener: Arc<dyn Shortener>,
    events: EventBus,
    reply_timeout: Duration,
    state: Mutex<State>,
}

impl BotSession {
    pub fn new(
        connector: Arc<dyn Connector>,
        shortener: Arc<dyn Shortener>,
        events: EventBus,
    ) -> Self {
        Self {
            connector,
            shortener,
            events,
            reply_timeout: Duration::from_secs(5),
            state: Mutex::new(State::Uninitialized),
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status()
    }

    /// Bind the transport to `credential` and register the message router.
    pub async fn initialize(&self, credential: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !matches!(*state, State::Uninitialized) {
            return Err(Error::Usage("bot session is already initialized".to_string()));
        }

        let transport = self.connector.connect(credential)?;
        let router = MessageRouter::new(
            transport.messenger(),
            self.shortener.clone(),
            self.events.clone(),
        )
        .with_reply_timeout(self.reply_timeout);

        *state = State::Ready(Bound {
            transport,
            router: Arc::new(router),
        });
        tracing::info!("bot session initialized");
        Ok(())
    }

    /// Begin receiving inbound messages. Returns once polling is underway.
    pub async fn start(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let bound = match &*state {
            State::Uninitialized => return Err(not_initialized("start")),
            State::Receiving(_) => {
                return Err(Error::Usage("bot session is already receiving".to_string()))
            }
            State::Ready(bound) => bound.clone(),
        };

        bound
            .transport
            .start_receiving(bound.router.clone())
            .await?;
        *state = State::Receiving(bound);
        tracing::info!("bot session started receiving");
        Ok(())
    }

    /// Stop dispatching new inbound messages. A no-op while `Ready`.
    pub async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let bound = match &*state {
            State::Uninitialized => return Err(not_initialized("stop")),
            State::Ready(_) => return Ok(()),
            State::Receiving(bound) => bound.clone(),
        };

        bound.transport.stop_receiving().await?;
        *state = State::Ready(bound);
        tracing::info!("bot session stopped receiving");
        Ok(())
    }
}

fn not_initialized(op: &str) -> Error {
    Error::Usage(format!(
        "cannot {op}: bot session is not initialized (call initialize first)"
    ))
}
