//! # pricetick-feed
//!
//! Upstream price providers implementing [`pricetick_core::PriceFeed`]:
//! the Binance REST ticker and the JSON endpoint of a pricetick relay
//! server. Both are blocking and meant to be wrapped in a
//! [`pricetick_core::PriceSource`].

pub mod binance;
pub mod config;
mod http;
pub mod relay;

pub use binance::BinanceFeed;
pub use config::FeedConfig;
pub use relay::RelayFeed;
