//! Price samples and the quotes served from the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// A single observed price. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Instrument the value belongs to (e.g. `BTCUSDT`).
    pub symbol: String,
    /// Finite, strictly positive price.
    #[serde(rename = "price")]
    pub value: f64,
    /// Wall-clock time the sample was taken.
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    /// Create a sample observed now.
    pub fn new(symbol: impl Into<String>, value: f64) -> Result<Self, FeedError> {
        Self::observed(symbol, value, Utc::now())
    }

    /// Create a sample with an explicit observation time.
    pub fn observed(
        symbol: impl Into<String>,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, FeedError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(FeedError::InvalidValue(value.to_string()));
        }
        Ok(Self {
            symbol: symbol.into(),
            value,
            observed_at,
        })
    }
}

/// Where a served quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Fetched from upstream by this call.
    Fresh,
    /// Served from a cache entry younger than the TTL.
    Cached,
    /// Served from an expired cache entry because the refresh failed.
    Stale,
}

/// A sample together with its freshness flag.
///
/// Serializes to the relay wire shape
/// `{symbol, price, timestamp, cached, stale?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub sample: PriceSample,
    pub freshness: Freshness,
}

impl Quote {
    #[must_use]
    pub fn new(sample: PriceSample, freshness: Freshness) -> Self {
        Self { sample, freshness }
    }

    /// The numeric price.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.sample.value
    }

    /// True when the quote did not come from upstream on this call.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        matches!(self.freshness, Freshness::Cached | Freshness::Stale)
    }

    /// True when the quote is older than the TTL.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

#[derive(Serialize, Deserialize)]
struct QuoteWire {
    #[serde(default)]
    symbol: String,
    price: f64,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    cached: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    stale: bool,
}

impl Serialize for Quote {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuoteWire {
            symbol: self.sample.symbol.clone(),
            price: self.sample.value,
            timestamp: self.sample.observed_at,
            cached: self.is_cached(),
            stale: self.is_stale(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = QuoteWire::deserialize(deserializer)?;
        let sample = PriceSample::observed(wire.symbol, wire.price, wire.timestamp)
            .map_err(serde::de::Error::custom)?;
        let freshness = match (wire.cached, wire.stale) {
            (_, true) => Freshness::Stale,
            (true, false) => Freshness::Cached,
            (false, false) => Freshness::Fresh,
        };
        Ok(Self { sample, freshness })
    }
}
