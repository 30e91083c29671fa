//! Shared fixtures for the workspace integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use pricetick_core::{FeedError, PriceFeed, PriceSample};

/// Feed that replays a script of outcomes, then keeps failing.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<f64, FeedError>>>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(script: impl IntoIterator<Item = Result<f64, FeedError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append an outcome to the script.
    pub fn push(&self, outcome: Result<f64, FeedError>) {
        self.script.lock().push_back(outcome);
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
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
            .unwrap_or_else(|| Err(FeedError::Transport("script exhausted".into())));
        next.and_then(|value| PriceSample::new(symbol, value))
    }
}
