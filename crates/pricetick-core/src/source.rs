//! Rate-limited price source with a short-lived cache and stale fallback.
//!
//! `PriceSource` sits in front of an upstream [`PriceFeed`]. A sample younger
//! than the TTL is served straight from the cache. An older one triggers a
//! refresh; if that refresh fails the expired sample is served as
//! [`Freshness::Stale`] rather than surfacing the error. Only a source that
//! has never fetched successfully reports
//! [`TickerError::UpstreamUnavailable`].
//!
//! Refreshes are single-flight: concurrent callers that find the cache
//! expired queue on a refresh lock. Once they hold it they reuse the outcome
//! of any attempt that completed while they waited, successful or not, so a
//! burst of requests costs one upstream call even during an outage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_SYMBOL};
use crate::error::{FeedError, TickerError};
use crate::sample::{Freshness, PriceSample, Quote};

/// Upstream provider of price samples.
pub trait PriceFeed: Send + Sync {
    /// Retrieve the current price for `symbol`.
    fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError>;
}

impl<F: PriceFeed + ?Sized> PriceFeed for Arc<F> {
    fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
        (**self).fetch(symbol)
    }
}

impl<F: PriceFeed + ?Sized> PriceFeed for Box<F> {
    fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
        (**self).fetch(symbol)
    }
}

/// Configuration for a [`PriceSource`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Symbol requested from the feed.
    pub symbol: String,
    /// Maximum age at which a cached sample is served without re-fetching.
    pub ttl: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// The single cached sample and when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub sample: PriceSample,
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Counters describing how calls were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Calls made to the upstream feed.
    pub upstream_calls: u64,
    /// Calls answered from a fresh cache entry.
    pub cache_hits: u64,
    /// Calls answered from an expired entry after a failed refresh.
    pub stale_served: u64,
    /// Upstream calls that failed.
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    upstream_calls: AtomicU64,
    cache_hits: AtomicU64,
    stale_served: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SourceStats {
        SourceStats {
            upstream_calls: self.upstream_calls.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Cached, fault-tolerant front for a [`PriceFeed`].
pub struct PriceSource<F: PriceFeed, C: Clock = SystemClock> {
    feed: F,
    clock: C,
    config: SourceConfig,
    entry: RwLock<Option<CacheEntry>>,
    refresh: Mutex<()>,
    /// Completed upstream attempts.
    attempts: AtomicU64,
    /// Error of the latest attempt, `None` after a success.
    last_failure: Mutex<Option<FeedError>>,
    counters: Counters,
}

impl<F: PriceFeed> PriceSource<F, SystemClock> {
    /// Create a source backed by the system clock.
    pub fn new(feed: F, config: SourceConfig) -> Self {
        Self::with_clock(feed, config, SystemClock)
    }
}

impl<F: PriceFeed, C: Clock> PriceSource<F, C> {
    /// Create a source with an injected clock.
    pub fn with_clock(feed: F, config: SourceConfig, clock: C) -> Self {
        Self {
            feed,
            clock,
            config,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_failure: Mutex::new(None),
            counters: Counters::default(),
        }
    }

    /// The configured symbol.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Snapshot of the cache entry, if any.
    pub fn entry(&self) -> Option<CacheEntry> {
        self.entry.read().clone()
    }

    /// Drop the cache entry, returning the source to its initial state.
    pub fn reset(&self) {
        *self.entry.write() = None;
        debug!(symbol = %self.config.symbol, "price cache reset");
    }

    /// Counters describing how calls were served.
    pub fn stats(&self) -> SourceStats {
        self.counters.snapshot()
    }

    /// Get the current price.
    ///
    /// Fails only when the upstream is down and nothing was ever cached.
    pub fn get(&self) -> Result<Quote, TickerError> {
        if let Some(quote) = self.cached_quote() {
            return Ok(quote);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let _refresh = self.refresh.lock();
        // Another caller may have refreshed while we waited for the lock.
        if let Some(quote) = self.cached_quote() {
            return Ok(quote);
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            let failure = self.last_failure.lock().clone();
            if let Some(err) = failure {
                debug!(symbol = %self.config.symbol, "reusing failed refresh");
                return self.fall_back(err, self.clock.now());
            }
        }

        let started = self.clock.now();
        Counters::bump(&self.counters.upstream_calls);
        let outcome = self.feed.fetch(&self.config.symbol);
        *self.last_failure.lock() = outcome.as_ref().err().cloned();
        self.attempts.fetch_add(1, Ordering::Release);
        match outcome {
            Ok(sample) => {
                info!(
                    symbol = %self.config.symbol,
                    price = sample.value,
                    "fetched fresh price"
                );
                *self.entry.write() = Some(CacheEntry {
                    sample: sample.clone(),
                    fetched_at: started,
                });
                Ok(Quote::new(sample, Freshness::Fresh))
            }
            Err(err) => {
                Counters::bump(&self.counters.failures);
                self.fall_back(err, started)
            }
        }
    }

    /// Serve the expired entry as stale, or report the upstream as down.
    fn fall_back(&self, err: FeedError, now: Instant) -> Result<Quote, TickerError> {
        let previous = self.entry.read().clone();
        match previous {
            Some(entry) => {
                warn!(
                    symbol = %self.config.symbol,
                    error = %err,
                    age_ms = now.saturating_duration_since(entry.fetched_at).as_millis(),
                    "refresh failed, serving stale price"
                );
                Counters::bump(&self.counters.stale_served);
                Ok(Quote::new(entry.sample, Freshness::Stale))
            }
            None => {
                warn!(symbol = %self.config.symbol, error = %err, "no price available");
                Err(TickerError::UpstreamUnavailable {
                    symbol: self.config.symbol.clone(),
                    source: err,
                })
            }
        }
    }

    fn cached_quote(&self) -> Option<Quote> {
        let now = self.clock.now();
        let guard = self.entry.read();
        let entry = guard.as_ref().filter(|e| e.is_fresh(now, self.config.ttl))?;
        Counters::bump(&self.counters.cache_hits);
        debug!(symbol = %self.config.symbol, "serving cached price");
        Some(Quote::new(entry.sample.clone(), Freshness::Cached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::VecDeque;

    /// Feed that replays a script of outcomes, then keeps failing.
    struct ScriptedFeed {
        script: Mutex<VecDeque<Result<f64, FeedError>>>,
        calls: AtomicU64,
    }

    impl ScriptedFeed {
        fn new(script: Vec<Result<f64, FeedError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU64::new(0),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceFeed for ScriptedFeed {
        fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .pop_front()
                .unwrap_or(Err(FeedError::Status(503)));
            next.and_then(|v| PriceSample::new(symbol, v))
        }
    }

    fn source(
        script: Vec<Result<f64, FeedError>>,
    ) -> (PriceSource<Arc<ScriptedFeed>, ManualClock>, Arc<ScriptedFeed>, ManualClock) {
        let feed = Arc::new(ScriptedFeed::new(script));
        let clock = ManualClock::new();
        let config = SourceConfig {
            symbol: "BTCUSDT".into(),
            ttl: Duration::from_millis(1000),
        };
        let source = PriceSource::with_clock(Arc::clone(&feed), config, clock.clone());
        (source, feed, clock)
    }

    #[test]
    fn first_call_is_fresh() {
        let (source, feed, _clock) = source(vec![Ok(50_000.12)]);
        let quote = source.get().unwrap();
        assert_eq!(quote.freshness, Freshness::Fresh);
        assert!((quote.value() - 50_000.12).abs() < f64::EPSILON);
        assert_eq!(feed.calls(), 1);
    }

    #[test]
    fn ttl_timeline_fresh_cached_stale() {
        let (source, feed, clock) = source(vec![Ok(50_000.12)]);

        let first = source.get().unwrap();
        assert_eq!(first.freshness, Freshness::Fresh);

        clock.set_elapsed(Duration::from_millis(500));
        let second = source.get().unwrap();
        assert_eq!(second.freshness, Freshness::Cached);
        assert_eq!(second.sample, first.sample);
        assert_eq!(feed.calls(), 1);

        clock.set_elapsed(Duration::from_millis(1100));
        let third = source.get().unwrap();
        assert_eq!(third.freshness, Freshness::Stale);
        assert_eq!(third.sample, first.sample);
        assert_eq!(feed.calls(), 2);
    }

    #[test]
    fn entry_expires_exactly_at_ttl() {
        let (source, feed, clock) = source(vec![Ok(1.0), Ok(2.0)]);
        source.get().unwrap();
        clock.set_elapsed(Duration::from_millis(999));
        assert_eq!(source.get().unwrap().freshness, Freshness::Cached);
        clock.set_elapsed(Duration::from_millis(1000));
        let quote = source.get().unwrap();
        assert_eq!(quote.freshness, Freshness::Fresh);
        assert!((quote.value() - 2.0).abs() < f64::EPSILON);
        assert_eq!(feed.calls(), 2);
    }

    #[test]
    fn failure_without_cache_is_upstream_unavailable() {
        let (source, _feed, _clock) = source(vec![Err(FeedError::Transport("down".into()))]);
        let err = source.get().unwrap_err();
        match err {
            TickerError::UpstreamUnavailable { symbol, source } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(source, FeedError::Transport("down".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn recovers_after_stale() {
        let (source, _feed, clock) = source(vec![Ok(1.0), Err(FeedError::Status(500)), Ok(3.0)]);
        source.get().unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(source.get().unwrap().freshness, Freshness::Stale);
        let quote = source.get().unwrap();
        assert_eq!(quote.freshness, Freshness::Fresh);
        assert!((quote.value() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_does_not_refresh_fetched_at() {
        let (source, _feed, clock) = source(vec![Ok(1.0)]);
        source.get().unwrap();
        let fetched_at = source.entry().unwrap().fetched_at;
        clock.advance(Duration::from_secs(5));
        source.get().unwrap();
        assert_eq!(source.entry().unwrap().fetched_at, fetched_at);
    }

    #[test]
    fn reset_clears_entry() {
        let (source, _feed, _clock) = source(vec![Ok(1.0)]);
        source.get().unwrap();
        assert!(source.entry().is_some());
        source.reset();
        assert!(source.entry().is_none());
        assert!(matches!(
            source.get(),
            Err(TickerError::UpstreamUnavailable { .. })
        ));
    }

    #[test]
    fn stats_track_each_path() {
        let (source, _feed, clock) = source(vec![Ok(1.0)]);
        source.get().unwrap();
        source.get().unwrap();
        clock.advance(Duration::from_secs(2));
        source.get().unwrap();
        let stats = source.stats();
        assert_eq!(stats.upstream_calls, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.stale_served, 1);
        assert_eq!(stats.failures, 1);
    }

    /// Feed that blocks until released, to hold a refresh in flight.
    struct GatedFeed {
        gate: crossbeam_channel::Receiver<()>,
        calls: AtomicU64,
    }

    impl PriceFeed for GatedFeed {
        fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.recv();
            PriceSample::new(symbol, 42.0)
        }
    }

    #[test]
    fn concurrent_callers_share_one_refresh() {
        let (release, gate) = crossbeam_channel::unbounded();
        let feed = Arc::new(GatedFeed {
            gate,
            calls: AtomicU64::new(0),
        });
        let source = Arc::new(PriceSource::with_clock(
            Arc::clone(&feed),
            SourceConfig::default(),
            ManualClock::new(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || source.get())
            })
            .collect();

        // Let the callers pile up behind the in-flight refresh.
        std::thread::sleep(Duration::from_millis(50));
        release.send(()).unwrap();
        drop(release);

        let quotes: Vec<Quote> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            quotes
                .iter()
                .filter(|q| q.freshness == Freshness::Fresh)
                .count(),
            1
        );
        assert!(quotes.iter().all(|q| (q.value() - 42.0).abs() < f64::EPSILON));
    }

    /// Feed whose first call succeeds; later calls wait for a release and fail.
    struct FlakyFeed {
        gate: crossbeam_channel::Receiver<()>,
        calls: AtomicU64,
    }

    impl PriceFeed for FlakyFeed {
        fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return PriceSample::new(symbol, 7.0);
            }
            let _ = self.gate.recv();
            Err(FeedError::Transport("timed out".into()))
        }
    }

    #[test]
    fn concurrent_callers_share_one_failed_refresh() {
        let (release, gate) = crossbeam_channel::unbounded();
        let feed = Arc::new(FlakyFeed {
            gate,
            calls: AtomicU64::new(0),
        });
        let clock = ManualClock::new();
        let source = Arc::new(PriceSource::with_clock(
            Arc::clone(&feed),
            SourceConfig::default(),
            clock.clone(),
        ));
        source.get().unwrap();
        clock.advance(Duration::from_secs(2));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || source.get())
            })
            .collect();

        std::thread::sleep(Duration::from_millis(50));
        release.send(()).unwrap();
        drop(release);

        let quotes: Vec<Quote> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
        assert!(quotes
            .iter()
            .all(|q| q.freshness == Freshness::Stale && (q.value() - 7.0).abs() < f64::EPSILON));
        let stats = source.stats();
        assert_eq!(stats.upstream_calls, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.stale_served, 8);
    }

    #[test]
    fn concurrent_callers_share_unavailable_error() {
        let (release, gate) = crossbeam_channel::unbounded();
        // Skip the successful first call so there is never an entry.
        let feed = Arc::new(FlakyFeed {
            gate,
            calls: AtomicU64::new(1),
        });
        let source = Arc::new(PriceSource::with_clock(
            Arc::clone(&feed),
            SourceConfig::default(),
            ManualClock::new(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || source.get())
            })
            .collect();

        std::thread::sleep(Duration::from_millis(50));
        release.send(()).unwrap();
        drop(release);

        for handle in handles {
            let err = handle.join().unwrap().unwrap_err();
            assert!(matches!(err, TickerError::UpstreamUnavailable { .. }));
        }
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.stats().upstream_calls, 1);
    }

    #[test]
    fn later_caller_retries_after_failure() {
        let (source, feed, _clock) = source(vec![Err(FeedError::Status(503)), Ok(5.0)]);
        assert!(source.get().is_err());
        assert_eq!(source.get().unwrap().freshness, Freshness::Fresh);
        assert_eq!(feed.calls(), 2);
    }
}
