use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_SHORTENER_API_URL: &str = "http://api.yon.ir/";
pub const DEFAULT_SHORT_LINK_BASE: &str = "http://yon.ir/";

/// Typed configuration for the bot process.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Shortening provider
    pub shortener_api_url: String,
    pub short_link_base: String,
    pub shorten_timeout: Duration,

    // Outbound replies
    pub reply_timeout: Duration,

    // Notifications
    pub event_buffer: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, test map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if telegram_bot_token.is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let shortener_api_url = lookup("SHORTENER_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_SHORTENER_API_URL.to_string());
        let short_link_base = lookup("SHORT_LINK_BASE")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_SHORT_LINK_BASE.to_string());

        let shorten_timeout =
            Duration::from_millis(parse_u64(lookup("SHORTEN_TIMEOUT_MS")).unwrap_or(5_000));
        let reply_timeout =
            Duration::from_millis(parse_u64(lookup("REPLY_TIMEOUT_MS")).unwrap_or(5_000));

        let event_buffer = parse_u64(lookup("EVENT_BUFFER"))
            .map(|n| n as usize)
            .filter(|n| *n > 0)
            .unwrap_or(256);

        Ok(Self {
            telegram_bot_token,
            shortener_api_url,
            short_link_base,
            shorten_timeout,
            reply_timeout,
            event_buffer,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
