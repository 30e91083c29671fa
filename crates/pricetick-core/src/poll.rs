//! Fixed-delay, non-overlapping polling of a price source.
//!
//! The delay is measured from the completion of one call to the start of the
//! next, after successes and failures alike. There is no backoff: a fixed
//! cadence keeps upstream call volume predictable.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::cancel::CancellationToken;
use crate::constants::DEFAULT_POLL_DELAY;
use crate::error::TickerError;
use crate::sample::Quote;
use crate::Trend;

/// Poll loop configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay after each completed call before the next one starts.
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_POLL_DELAY,
        }
    }
}

/// A distinct numeric change between two consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub previous: f64,
    pub current: f64,
}

impl PriceChange {
    /// Direction of the change.
    #[must_use]
    pub fn trend(&self) -> Trend {
        Trend::between(self.previous, self.current)
    }

    /// Signed difference `current - previous`.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.current - self.previous
    }
}

/// Latest two observed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollSnapshot {
    /// Most recent quote.
    pub current: Option<Quote>,
    /// Value observed before the last distinct change.
    pub previous: Option<f64>,
}

/// Tracks observations and reports distinct changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    snapshot: PollSnapshot,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote, returning the change it represents, if any.
    ///
    /// The first observation and repeats of the last value return `None`.
    #[allow(clippy::float_cmp)]
    pub fn observe(&mut self, quote: Quote) -> Option<PriceChange> {
        let last = self.snapshot.current.as_ref().map(Quote::value);
        let value = quote.value();
        self.snapshot.current = Some(quote);
        match last {
            Some(last) if last != value => {
                self.snapshot.previous = Some(last);
                Some(PriceChange {
                    previous: last,
                    current: value,
                })
            }
            _ => None,
        }
    }

    /// The latest two observations.
    #[must_use]
    pub fn snapshot(&self) -> &PollSnapshot {
        &self.snapshot
    }
}

/// Receives poll loop events. Called on the poll thread.
pub trait PollObserver: Send + Sync {
    /// Every successful retrieval, changed or not.
    fn on_quote(&self, quote: &Quote);

    /// Exactly once per distinct numeric change.
    fn on_change(&self, change: &PriceChange);

    /// A retrieval failed; the loop keeps going.
    fn on_failure(&self, error: &TickerError);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl PollObserver for NoOpObserver {
    fn on_quote(&self, _quote: &Quote) {}
    fn on_change(&self, _change: &PriceChange) {}
    fn on_failure(&self, _error: &TickerError) {}
}

/// Handle to a running poll loop.
///
/// Dropping the handle stops the loop.
pub struct PollLoop {
    cancel: CancellationToken,
    wake: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    tracker: Arc<RwLock<ChangeTracker>>,
}

impl PollLoop {
    /// Start polling `fetch` on a dedicated thread.
    ///
    /// The first call happens immediately.
    pub fn spawn<F>(
        config: PollConfig,
        mut fetch: F,
        observer: Arc<dyn PollObserver>,
    ) -> Result<Self, TickerError>
    where
        F: FnMut() -> Result<Quote, TickerError> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (wake, sleeper) = bounded::<()>(0);
        let tracker = Arc::new(RwLock::new(ChangeTracker::new()));

        let thread_cancel = cancel.clone();
        let thread_tracker = Arc::clone(&tracker);
        let delay = config.delay;
        let handle = std::thread::Builder::new()
            .name("pricetick-poll".into())
            .spawn(move || {
                debug!(delay_ms = delay.as_millis(), "poll loop started");
                loop {
                    let outcome = fetch();
                    // A call that completes after stop() has no observable effect.
                    if thread_cancel.is_cancelled() {
                        break;
                    }
                    match outcome {
                        Ok(quote) => {
                            trace!(price = quote.value(), freshness = ?quote.freshness, "poll tick");
                            observer.on_quote(&quote);
                            let change = thread_tracker.write().observe(quote);
                            if let Some(change) = change {
                                observer.on_change(&change);
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "poll failed, retrying after delay");
                            observer.on_failure(&err);
                        }
                    }
                    match sleeper.recv_timeout(delay) {
                        Err(RecvTimeoutError::Timeout) if !thread_cancel.is_cancelled() => {}
                        _ => break,
                    }
                }
                debug!("poll loop stopped");
            })?;

        Ok(Self {
            cancel,
            wake: Some(wake),
            handle: Some(handle),
            tracker,
        })
    }

    /// The latest two observations.
    #[must_use]
    pub fn latest(&self) -> PollSnapshot {
        self.tracker.read().snapshot().clone()
    }

    /// Whether the loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for the worker to exit.
    ///
    /// Any pending delay is cut short; a fetch already in flight is allowed
    /// to return but its result is discarded.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        // Disconnecting the channel wakes the worker out of its delay.
        self.wake.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("poll thread panicked");
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::sample::{Freshness, PriceSample};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn quote(value: f64) -> Quote {
        Quote::new(PriceSample::new("BTCUSDT", value).unwrap(), Freshness::Fresh)
    }

    #[derive(Default)]
    struct Recorder {
        quotes: Mutex<Vec<f64>>,
        changes: Mutex<Vec<PriceChange>>,
        failures: AtomicUsize,
    }

    impl PollObserver for Recorder {
        fn on_quote(&self, quote: &Quote) {
            self.quotes.lock().push(quote.value());
        }
        fn on_change(&self, change: &PriceChange) {
            self.changes.lock().push(*change);
        }
        fn on_failure(&self, _error: &TickerError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        done()
    }

    #[test]
    fn tracker_first_observation_is_not_a_change() {
        let mut tracker = ChangeTracker::new();
        assert_eq!(tracker.observe(quote(10.0)), None);
        assert!(tracker.snapshot().previous.is_none());
    }

    #[test]
    fn tracker_reports_each_distinct_change_once() {
        let mut tracker = ChangeTracker::new();
        let changes: Vec<_> = [10.0, 10.0, 11.0, 11.0, 11.0, 9.5, 9.5]
            .into_iter()
            .filter_map(|v| tracker.observe(quote(v)))
            .collect();
        assert_eq!(
            changes,
            vec![
                PriceChange {
                    previous: 10.0,
                    current: 11.0
                },
                PriceChange {
                    previous: 11.0,
                    current: 9.5
                },
            ]
        );
        assert_eq!(tracker.snapshot().previous, Some(11.0));
        assert_eq!(tracker.snapshot().current.as_ref().map(Quote::value), Some(9.5));
    }

    #[test]
    fn change_trend_and_delta() {
        let up = PriceChange {
            previous: 1.0,
            current: 2.5,
        };
        assert_eq!(up.trend(), Trend::Up);
        assert!((up.delta() - 1.5).abs() < f64::EPSILON);
        let down = PriceChange {
            previous: 2.0,
            current: 1.0,
        };
        assert_eq!(down.trend(), Trend::Down);
    }

    #[test]
    fn loop_keeps_polling_through_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn PollObserver> = recorder.clone();

        let mut poll = PollLoop::spawn(
            PollConfig {
                delay: Duration::from_millis(5),
            },
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(TickerError::UpstreamUnavailable {
                        symbol: "BTCUSDT".into(),
                        source: FeedError::Status(503),
                    })
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let value = 100.0 + n as f64;
                    Ok(quote(value))
                }
            },
            observer,
        )
        .unwrap();

        assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 6));
        poll.stop();
        assert!(!poll.is_running());
        assert!(recorder.failures.load(Ordering::SeqCst) >= 3);
        assert!(recorder.quotes.lock().len() >= 2);
        assert!(!recorder.changes.lock().is_empty());
    }

    #[test]
    fn equal_values_do_not_fire_changes() {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn PollObserver> = recorder.clone();
        let mut poll = PollLoop::spawn(
            PollConfig {
                delay: Duration::from_millis(1),
            },
            || Ok(quote(7.0)),
            observer,
        )
        .unwrap();
        assert!(wait_until(Duration::from_secs(2), || recorder.quotes.lock().len() >= 5));
        poll.stop();
        assert!(recorder.changes.lock().is_empty());
        assert!(poll.latest().previous.is_none());
    }

    #[test]
    fn stop_cuts_the_delay_short() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut poll = PollLoop::spawn(
            PollConfig {
                delay: Duration::from_secs(3600),
            },
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(quote(1.0))
            },
            Arc::new(NoOpObserver),
        )
        .unwrap();

        assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) == 1));
        let started = Instant::now();
        poll.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn result_of_in_flight_fetch_after_stop_is_discarded() {
        let (release, gate) = bounded::<()>(0);
        let (entered_tx, entered) = bounded::<()>(1);
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn PollObserver> = recorder.clone();

        let mut poll = PollLoop::spawn(
            PollConfig {
                delay: Duration::from_millis(1),
            },
            move || {
                let _ = entered_tx.try_send(());
                let _ = gate.recv();
                Ok(quote(5.0))
            },
            observer,
        )
        .unwrap();

        entered.recv_timeout(Duration::from_secs(2)).unwrap();
        // Release the fetch only after cancellation has been requested.
        let releaser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(release);
        });
        poll.stop();
        releaser.join().unwrap();
        assert!(recorder.quotes.lock().is_empty());
    }

    #[test]
    fn drop_stops_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        {
            let _poll = PollLoop::spawn(
                PollConfig {
                    delay: Duration::from_millis(1),
                },
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(quote(1.0))
                },
                Arc::new(NoOpObserver),
            )
            .unwrap();
            assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) > 0));
        }
        let after_drop = calls.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }
}
