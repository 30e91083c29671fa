//! Feed reading another pricetick instance's relay endpoint.
//!
//! Many dashboards can share one upstream budget by polling a relay
//! (`pricetick --serve`) instead of the exchange.

use pricetick_core::{FeedError, PriceFeed, PriceSample, Quote};
use reqwest::blocking::Client;
use tracing::debug;

use crate::config::FeedConfig;
use crate::http::get_text;

/// Path served by the relay.
pub const PRICE_PATH: &str = "/api/price";

/// Decode a relay response body.
///
/// Bodies without a `symbol` field are attributed to `symbol`.
pub fn parse_quote(symbol: &str, body: &str) -> Result<Quote, FeedError> {
    let mut quote: Quote =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    if quote.sample.symbol.is_empty() {
        quote.sample.symbol = symbol.to_string();
    }
    Ok(quote)
}

/// Price feed backed by a pricetick relay server.
#[derive(Debug, Clone)]
pub struct RelayFeed {
    client: Client,
    url: String,
}

impl RelayFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: config.client()?,
            url: config.url(PRICE_PATH),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PriceFeed for RelayFeed {
    fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
        let body = get_text(&self.client, &self.url)?;
        let quote = parse_quote(symbol, &body)?;
        if quote.is_stale() {
            debug!(url = %self.url, "relay served a stale quote");
        }
        Ok(quote.sample)
    }
}
