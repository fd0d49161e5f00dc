//! Terminal client for the status endpoints.
//!
//! Mirrors the browser page: each trigger shows a loading state and then
//! settles in `Success` with the pretty-printed payload or `Failure` with a
//! message. Transport errors, error envelopes and non-JSON bodies all end in
//! `Failure`; nothing is left in `Loading`.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

/// Default per-request timeout for the client
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    /// Pretty-printed JSON payload
    Success(String),
    /// Human-readable failure message
    Failure(String),
}

impl ViewState {
    pub fn is_success(&self) -> bool {
        matches!(self, ViewState::Success(_))
    }

    /// Classify a finished HTTP exchange.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => {
                return ViewState::Failure(format!("HTTP {}: response was not JSON", status.as_u16()))
            }
        };

        let is_error_envelope = value.get("status").and_then(Value::as_str) == Some("error");
        if status.is_success() && !is_error_envelope {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            return ViewState::Success(pretty);
        }

        match value.get("message").and_then(Value::as_str) {
            Some(message) if !message.is_empty() => ViewState::Failure(message.to_string()),
            _ => ViewState::Failure(format!("HTTP {}", status.as_u16())),
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::Loading => write!(f, "Loading..."),
            ViewState::Success(payload) => write!(f, "OK\n{payload}"),
            ViewState::Failure(message) => write!(f, "ERROR: {message}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid base URL {0:?}: expected http:// or https://")]
    BaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for `/hello` and `/status`.
#[derive(Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and settle into `Success` or `Failure`.
    pub async fn fetch(&self, path: &str) -> ViewState {
        let url = format!("{}{}", self.base_url, path);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%url, error = %e, "Request failed");
                return ViewState::Failure(format!("Request failed: {e}"));
            }
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => ViewState::from_response(status, &body),
            Err(e) => ViewState::Failure(format!("Failed to read response: {e}")),
        }
    }

    pub async fn hello(&self) -> ViewState {
        self.fetch("/hello").await
    }

    pub async fn status(&self) -> ViewState {
        self.fetch("/status").await
    }
}

/// Fetch both endpoints once and print them. Returns whether both succeeded.
pub async fn check_once(client: &StatusClient) -> bool {
    let mut all_ok = true;
    for (label, path) in [("hello", "/hello"), ("status", "/status")] {
        println!("[{label}] {}", ViewState::Loading);
        let state = client.fetch(path).await;
        all_ok &= state.is_success();
        println!("[{label}] {state}");
    }
    all_ok
}

/// Run `check_once` on an interval until Ctrl+C.
pub async fn watch(client: &StatusClient, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                check_once(client).await;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
}
