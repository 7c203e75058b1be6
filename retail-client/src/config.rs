//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default backend URL
pub const DEFAULT_API_URL: &str = "http://localhost:3001";
/// Default page the payment gateway sends the customer back to
pub const DEFAULT_RETURN_URL: &str = "http://localhost:5173/payment-success";
/// Trailing-edge debounce window for catalog search
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Client configuration for the retail backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:3001")
    pub base_url: String,

    /// Bearer token for authenticated calls
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// URL the gateway redirects the customer to after checkout
    pub return_url: String,

    /// URL the gateway calls back server-to-server
    pub callback_url: String,

    /// Directory holding the durable draft order
    pub draft_dir: PathBuf,

    /// Catalog search debounce window
    pub search_debounce: Duration,
}

impl ClientConfig {
    /// Create a new client configuration with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            return_url: DEFAULT_RETURN_URL.to_string(),
            callback_url: DEFAULT_RETURN_URL.to_string(),
            draft_dir: PathBuf::from("./work_dir"),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }

    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `RETAIL_API_URL` | `http://localhost:3001` |
    /// | `RETAIL_RETURN_URL` | `http://localhost:5173/payment-success` |
    /// | `RETAIL_CALLBACK_URL` | the return URL |
    /// | `RETAIL_DRAFT_DIR` | `./work_dir` |
    /// | `RETAIL_TIMEOUT_SECS` | `30` |
    /// | `RETAIL_SEARCH_DEBOUNCE_MS` | `300` |
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("RETAIL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let return_url =
            std::env::var("RETAIL_RETURN_URL").unwrap_or_else(|_| DEFAULT_RETURN_URL.into());
        let callback_url = std::env::var("RETAIL_CALLBACK_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| return_url.clone());

        let timeout = parse_env("RETAIL_TIMEOUT_SECS", 30)?;
        let debounce_ms = parse_env("RETAIL_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;

        Ok(Self::new(base_url)
            .with_timeout(timeout)
            .with_return_urls(return_url, callback_url)
            .with_draft_dir(
                std::env::var("RETAIL_DRAFT_DIR").unwrap_or_else(|_| "./work_dir".into()),
            )
            .with_search_debounce(Duration::from_millis(debounce_ms)))
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the gateway return and callback URLs
    pub fn with_return_urls(
        mut self,
        return_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        self.return_url = return_url.into();
        self.callback_url = callback_url.into();
        self
    }

    /// Set the durable draft directory
    pub fn with_draft_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft_dir = dir.into();
        self
    }

    /// Set the catalog search debounce window
    pub fn with_search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = window;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn parse_env(name: &str, default: u64) -> ClientResult<u64> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{name} must be a number, got {raw:?}"))),
        _ => Ok(default),
    }
}
