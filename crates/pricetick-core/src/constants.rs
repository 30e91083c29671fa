//! Default timings and limits.

use std::time::Duration;

/// Default symbol polled when none is configured.
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// Maximum age of a cached sample served without re-fetching.
///
/// At one upstream call per second the source stays far below Binance's
/// 6000 request-weight per minute budget.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1000);

/// Delay between the completion of one poll and the start of the next.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(2);

/// Length of a digit transition animation.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(3000);

/// How long the decimal point pulses after a new transition starts.
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(300);

/// How long the change indicator stays visible after a transition.
pub const CHANGE_INDICATOR_DURATION: Duration = Duration::from_millis(500);

/// Fraction digits in the canonical formatted price.
pub const PRICE_DECIMALS: usize = 2;

/// Smallest history buffer that can still draw a segment.
pub const MIN_HISTORY_LEN: usize = 2;

/// Upper bound on a derived history length.
pub const MAX_HISTORY_LEN: usize = 1024;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// No price could be obtained from upstream or cache.
    pub const ERROR_UPSTREAM: i32 = 2;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
