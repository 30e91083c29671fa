//! # pricetick-core
//!
//! Core library for the pricetick live price ticker. Provides the TTL-cached
//! price source with stale fallback, the fixed-delay poll loop, the
//! digit-diff animator and the trend sparkline geometry. Everything here is
//! independent of any rendering surface.

pub mod animator;
pub mod cancel;
pub mod clock;
pub mod constants;
pub mod error;
pub mod format;
pub mod highlight;
pub mod history;
pub mod poll;
pub mod sample;
pub mod source;
pub mod sparkline;
pub mod trend;

// Re-exports
pub use animator::{AnimationConfig, DigitAnimator, Easing, Frame, Transition};
pub use constants::{
    exit_codes, DEFAULT_ANIMATION_DURATION, DEFAULT_CACHE_TTL, DEFAULT_POLL_DELAY, DEFAULT_SYMBOL,
};
pub use error::{FeedError, TickerError};
pub use format::{format_delta, format_price};
pub use highlight::{HighlightPolicy, HighlightSet};
pub use history::History;
pub use poll::{PollConfig, PollLoop, PollObserver, PriceChange};
pub use sample::{Freshness, PriceSample, Quote};
pub use source::{PriceFeed, PriceSource, SourceConfig};
pub use trend::Trend;

/// Final frame of an animated move from `previous` to `current`.
///
/// Convenience for text surfaces that print each change once instead of
/// animating it.
///
/// # Example
/// ```
/// use pricetick_core::{settle, AnimationConfig};
///
/// let frame = settle(Some(50_000.12), 50_001.07, &AnimationConfig::default()).unwrap();
/// assert_eq!(frame.text, "50,001.07");
/// assert!(frame.highlights.contains(5));
/// ```
#[must_use]
pub fn settle(previous: Option<f64>, current: f64, config: &AnimationConfig) -> Option<Frame> {
    let mut transition = Transition::new(previous, current, config)?;
    // Walk the transition so an accumulating policy sees the interpolated frames.
    let step = config.duration / SETTLE_STEPS;
    for i in 0..SETTLE_STEPS {
        transition.frame_at(step * i);
    }
    Some(transition.frame_at(config.duration))
}

const SETTLE_STEPS: u32 = 64;
