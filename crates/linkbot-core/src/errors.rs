/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the core can
/// decide what the user gets to see.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("shortening failed: {0}")]
    Shorten(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
