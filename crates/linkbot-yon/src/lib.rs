//! yon.ir adapter (URL shortening).
//!
//! `GET {api}?url={long_url}` answers with a JSON object whose `output` field is
//! the short-link id, published as `{short_link_base}/{id}` (a trailing `/` on
//! the base is added when missing).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use linkbot_core::{
    config::{Config, DEFAULT_SHORTENER_API_URL, DEFAULT_SHORT_LINK_BASE},
    errors::Error,
    ports::Shortener,
    Result,
};

#[derive(Debug, thiserror::Error)]
pub enum ShortenError {
    #[error("invalid shortener endpoint: {0}")]
    Endpoint(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response is not utf-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("response is not json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response has no usable `output` field: {0}")]
    MissingOutput(String),
}

impl From<ShortenError> for Error {
    fn from(e: ShortenError) -> Self {
        Error::Shorten(e.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct YonClient {
    api_url: String,
    short_link_base: String,
    http: reqwest::Client,
}

impl YonClient {
    pub fn new(
        api_url: impl Into<String>,
        short_link_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;
        let mut short_link_base = short_link_base.into();
        if !short_link_base.ends_with('/') {
            short_link_base.push('/');
        }
        Ok(Self {
            api_url: api_url.into(),
            short_link_base,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.shortener_api_url.clone(),
            cfg.short_link_base.clone(),
            cfg.shorten_timeout,
        )
    }

    /// Client for the public yon.ir endpoints.
    pub fn public(timeout: Duration) -> Result<Self> {
        Self::new(DEFAULT_SHORTENER_API_URL, DEFAULT_SHORT_LINK_BASE, timeout)
    }

    fn request_url(&self, long_url: &str) -> std::result::Result<Url, ShortenError> {
        Url::parse_with_params(&self.api_url, &[("url", long_url)])
            .map_err(|e| ShortenError::Endpoint(format!("{}: {e}", self.api_url)))
    }

    async fn fetch_id(&self, long_url: &str) -> std::result::Result<String, ShortenError> {
        let url = self.request_url(long_url)?;
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let text = std::str::from_utf8(&body)?;
        let v: serde_json::Value = serde_json::from_str(text)?;
        extract_output(&v)
    }
}

/// The short-link id from a yon.ir response body.
fn extract_output(v: &serde_json::Value) -> std::result::Result<String, ShortenError> {
    let id = match v.get("output") {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.is_empty() {
        return Err(ShortenError::MissingOutput(
            v.to_string().chars().take(200).collect(),
        ));
    }
    Ok(id)
}

#[async_trait]
impl Shortener for YonClient {
    async fn shorten(&self, url: &str) -> Result<String> {
        let id = self.fetch_id(url).await.map_err(|e| {
            tracing::debug!(url, "yon.ir lookup failed: {e}");
            Error::from(e)
        })?;
        Ok(format!("{}{}", self.short_link_base, id))
    }
}
