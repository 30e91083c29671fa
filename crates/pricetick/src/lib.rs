//! pricetick library: application logic for the live price ticker.

pub mod app;
pub mod config;
pub mod errors;
pub mod version;
