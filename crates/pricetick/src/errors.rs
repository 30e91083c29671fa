//! Error handling and exit codes.

use pricetick_core::constants::exit_codes;
use pricetick_core::{FeedError, TickerError};

/// Exit code for a pipeline error.
pub fn handle_error(err: &TickerError) -> i32 {
    match err {
        TickerError::UpstreamUnavailable { .. } => exit_codes::ERROR_UPSTREAM,
        TickerError::Config(_) => exit_codes::ERROR_CONFIG,
        TickerError::Cancelled => exit_codes::ERROR_CANCELED,
        TickerError::Io(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for any application error.
///
/// The first [`TickerError`] or [`FeedError`] in the chain decides; anything
/// else is a generic failure.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(ticker) = cause.downcast_ref::<TickerError>() {
            return handle_error(ticker);
        }
        if cause.is::<FeedError>() {
            return exit_codes::ERROR_UPSTREAM;
        }
    }
    exit_codes::ERROR_GENERIC
}
