//! Shared blocking GET with error classification.

use pricetick_core::FeedError;
use reqwest::blocking::Client;
use tracing::debug;

/// GET `url` and return the body of a 2xx response.
pub(crate) fn get_text(client: &Client, url: &str) -> Result<String, FeedError> {
    debug!(%url, "requesting price");
    let response = client
        .get(url)
        .send()
        .map_err(|e| FeedError::Transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    response
        .text()
        .map_err(|e| FeedError::Transport(e.to_string()))
}
