//! # pricetick-tui
//!
//! Live price dashboard using ratatui with Elm architecture: the animated
//! price, a change indicator, the trend sparkline and a log panel.

pub mod bridge;
pub mod footer;
pub mod header;
pub mod keymap;
pub mod logs;
pub mod messages;
pub mod model;
pub mod price;
pub mod sparkline;
pub mod styles;

pub use bridge::TuiPollObserver;
pub use header::FeedStatus;
pub use logs::LogPanel;
pub use messages::TuiMessage;
pub use model::{TuiApp, TuiOptions};
