//! TUI message types (Elm Messages).

use pricetick_core::{PriceChange, Quote};

use crate::keymap::KeyAction;

/// Messages that drive the TUI update cycle.
#[derive(Debug, Clone)]
pub enum TuiMessage {
    /// A quote arrived from the poll loop, changed or not.
    Quote(Quote),
    /// The price moved; starts a new transition.
    Change(PriceChange),
    /// A poll produced no quote at all.
    Failure(String),
    /// Free-form log line.
    Log(String),
    /// Frame clock tick.
    Tick,
    /// Terminal resize event.
    Resize { width: u16, height: u16 },
    /// Key press event forwarded from the event loop.
    KeyPress(KeyAction),
    /// Quit the application.
    Quit,
}
