//! Bridge between the poll loop and TUI messages.

use crossbeam_channel::Sender;

use pricetick_core::{PollObserver, PriceChange, Quote, TickerError};

use crate::messages::TuiMessage;

/// Poll observer that forwards events to the TUI channel.
///
/// Runs on the poll thread; the UI thread drains the channel once per
/// frame. Sends never block, so a stalled UI cannot stall polling.
pub struct TuiPollObserver {
    tx: Sender<TuiMessage>,
}

impl TuiPollObserver {
    #[must_use]
    pub fn new(tx: Sender<TuiMessage>) -> Self {
        Self { tx }
    }
}

impl PollObserver for TuiPollObserver {
    fn on_quote(&self, quote: &Quote) {
        let _ = self.tx.try_send(TuiMessage::Quote(quote.clone()));
    }

    fn on_change(&self, change: &PriceChange) {
        let _ = self.tx.try_send(TuiMessage::Change(*change));
    }

    fn on_failure(&self, error: &TickerError) {
        let _ = self.tx.try_send(TuiMessage::Failure(error.to_string()));
    }
}
