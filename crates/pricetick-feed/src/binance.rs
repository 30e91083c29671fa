//! Binance spot ticker feed (`GET /api/v3/ticker/price`).

use pricetick_core::{FeedError, PriceFeed, PriceSample};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::FeedConfig;
use crate::http::get_text;

const TICKER_PATH: &str = "/api/v3/ticker/price";

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[serde(default)]
    symbol: Option<String>,
    price: PriceField,
}

/// Binance quotes prices as strings; accept plain numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Text(String),
    Number(f64),
}

impl PriceField {
    fn value(&self) -> Result<f64, FeedError> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FeedError::Decode(format!("price is not a number: {s:?}"))),
        }
    }
}

/// Decode a ticker response body into a sample for `symbol`.
///
/// # Example
/// ```
/// use pricetick_feed::binance::parse_ticker;
///
/// let sample = parse_ticker("BTCUSDT", r#"{"symbol":"BTCUSDT","price":"64250.10000000"}"#).unwrap();
/// assert!((sample.value - 64_250.1).abs() < 1e-9);
/// ```
pub fn parse_ticker(symbol: &str, body: &str) -> Result<PriceSample, FeedError> {
    let ticker: TickerPrice =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    let value = ticker.price.value()?;
    let symbol = ticker.symbol.unwrap_or_else(|| symbol.to_string());
    PriceSample::new(symbol, value)
}

/// Price feed backed by the Binance REST API.
#[derive(Debug, Clone)]
pub struct BinanceFeed {
    client: Client,
    config: FeedConfig,
}

impl BinanceFeed {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: config.client()?,
            config,
        })
    }

    /// Ticker URL for `symbol`.
    #[must_use]
    pub fn ticker_url(&self, symbol: &str) -> String {
        format!("{}?symbol={symbol}", self.config.url(TICKER_PATH))
    }
}

impl PriceFeed for BinanceFeed {
    fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
        let body = get_text(&self.client, &self.ticker_url(symbol))?;
        parse_ticker(symbol, &body)
    }
}
