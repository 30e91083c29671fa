//! # pricetick-cli
//!
//! Plain streaming output, loading spinner and shell completion.

pub mod completion;
pub mod output;
pub mod presenter;
pub mod spinner;
pub mod ui;

pub use presenter::{PresenterOptions, StreamPresenter};
pub use spinner::LoadingSpinner;
