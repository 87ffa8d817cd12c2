use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);
const BODY_PREVIEW_CHARS: usize = 120;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
    #[error("request did not complete within {0:?}")]
    Timeout(Duration),
    #[error("upstream responded with HTTP {0}")]
    HttpStatus(u16),
    #[error("upstream body is not JSON: {0}")]
    InvalidBody(String),
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::Timeout(_) => "timeout",
            FetchError::HttpStatus(_) => "http_status",
            FetchError::InvalidBody(_) => "invalid_body",
            FetchError::Network(_) => "network",
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            FetchError::InvalidBody(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Single-attempt JSON GET with a hard deadline.
#[derive(Debug, Clone, Default)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and parses the body as JSON.
    ///
    /// The whole exchange, body included, runs under `timeout`. When the
    /// deadline passes the request future is dropped, which closes the
    /// underlying connection instead of leaving it running in the background.
    pub async fn fetch_json(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                url,
                parsed.scheme()
            )));
        }

        match tokio::time::timeout(timeout, self.exchange(parsed)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }

    async fn exchange(&self, url: Url) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await.map_err(FetchError::from_transport)?;
        parse_body(&text)
    }
}

fn parse_body(text: &str) -> Result<Value, FetchError> {
    let body = text.trim_start();
    if body.is_empty() {
        return Err(FetchError::InvalidBody("empty body".to_string()));
    }
    if body.starts_with('<') {
        return Err(FetchError::InvalidBody(format!("HTML response: {}", preview(body))));
    }

    serde_json::from_str(body).map_err(|e| FetchError::InvalidBody(format!("{}: {}", e, preview(body))))
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
