//! pricetick: live price ticker.

use std::process::ExitCode;

use pricetick_cli::ui;
use pricetick_core::constants::exit_codes;
use pricetick_lib::config::{AppConfig, Mode};
use pricetick_lib::{app, errors};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = AppConfig::parse();
    init_tracing(&config);

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = errors::exit_code(&err);
            if code != exit_codes::ERROR_CANCELED {
                ui::print_error(&format!("{err:#}"));
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(config: &AppConfig) {
    // The dashboard owns the terminal; it reports status in its log panel.
    let dashboard = config.completion.is_none()
        && config.mode(console::Term::stdout().is_term()) == Mode::Tui;
    let default = if dashboard {
        LevelFilter::OFF
    } else if config.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .init();
}
