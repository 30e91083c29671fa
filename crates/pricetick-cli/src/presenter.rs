//! Poll observer that streams one line per price change.

use std::io::{self, Write};

use parking_lot::Mutex;
use pricetick_core::format::format_price;
use pricetick_core::{
    settle, AnimationConfig, Freshness, PollObserver, PriceChange, Quote, TickerError,
};
use tracing::debug;

use crate::output::{highlighted_price, quote_line, value_line};
use crate::spinner::LoadingSpinner;

/// Presentation options for [`StreamPresenter`].
#[derive(Debug, Clone, Default)]
pub struct PresenterOptions {
    /// Print the bare value only.
    pub quiet: bool,
    /// Emit ANSI styling.
    pub colored: bool,
    /// Used to compute which digits changed.
    pub animation: AnimationConfig,
}

struct State {
    out: Box<dyn Write + Send>,
    last: Option<Quote>,
    printed: bool,
    stale: bool,
    spinner: Option<LoadingSpinner>,
}

/// Prints the first quote and then every distinct change.
///
/// Each change is settled through the digit animator so the digits that
/// moved can be styled. Feed failures and stale periods are reported inline.
pub struct StreamPresenter {
    options: PresenterOptions,
    state: Mutex<State>,
}

impl StreamPresenter {
    /// Presenter writing to stdout.
    #[must_use]
    pub fn stdout(options: PresenterOptions) -> Self {
        Self::new(options, Box::new(io::stdout()))
    }

    #[must_use]
    pub fn new(options: PresenterOptions, out: Box<dyn Write + Send>) -> Self {
        Self {
            options,
            state: Mutex::new(State {
                out,
                last: None,
                printed: false,
                stale: false,
                spinner: None,
            }),
        }
    }

    /// Attach a spinner that is cleared once anything is printed.
    #[must_use]
    pub fn with_spinner(self, spinner: LoadingSpinner) -> Self {
        self.state.lock().spinner = Some(spinner);
        self
    }

    fn write_line(state: &mut State, line: &str) {
        if let Some(spinner) = state.spinner.take() {
            spinner.finish();
        }
        if let Err(err) = writeln!(state.out, "{line}").and_then(|()| state.out.flush()) {
            debug!(error = %err, "failed to write output line");
        }
    }
}

impl PollObserver for StreamPresenter {
    fn on_quote(&self, quote: &Quote) {
        let mut state = self.state.lock();
        let stale = quote.freshness == Freshness::Stale;
        if !self.options.quiet && stale != state.stale && state.printed {
            let line = if stale {
                format!("{}  upstream failing, serving last known price", quote.sample.symbol)
            } else {
                format!("{}  upstream recovered", quote.sample.symbol)
            };
            Self::write_line(&mut state, &line);
        }
        state.stale = stale;

        if !state.printed {
            let line = if self.options.quiet {
                value_line(quote.value())
            } else {
                quote_line(quote, &format_price(quote.value()), None, self.options.colored)
            };
            Self::write_line(&mut state, &line);
            state.printed = true;
        }
        state.last = Some(quote.clone());
    }

    fn on_change(&self, change: &PriceChange) {
        let mut state = self.state.lock();
        if self.options.quiet {
            Self::write_line(&mut state, &value_line(change.current));
            return;
        }
        let Some(quote) = state.last.clone() else {
            return;
        };
        let price = settle(Some(change.previous), change.current, &self.options.animation)
            .map_or_else(
                || format_price(change.current),
                |frame| highlighted_price(&frame, self.options.colored),
            );
        let line = quote_line(&quote, &price, Some(change), self.options.colored);
        Self::write_line(&mut state, &line);
    }

    fn on_failure(&self, error: &TickerError) {
        if self.options.quiet {
            return;
        }
        let mut state = self.state.lock();
        if let Some(spinner) = &state.spinner {
            spinner.set_message(format!("waiting for upstream ({error})"));
            return;
        }
        let line = format!("[ERROR] {error}");
        Self::write_line(&mut state, &line);
    }
}
