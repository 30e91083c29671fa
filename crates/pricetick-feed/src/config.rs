//! Feed connection settings.

use std::time::Duration;

use pricetick_core::FeedError;
use reqwest::blocking::Client;

/// Public Binance REST endpoint.
pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings shared by every feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Scheme, host and optional port; no trailing path.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl FeedConfig {
    /// Settings for `base_url` with default timeout and user agent.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// `base_url` joined with `path`, tolerating a trailing slash.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn client(&self) -> Result<Client, FeedError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("pricetick/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
