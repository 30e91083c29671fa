//! Application entry point and dispatch.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use pricetick_cli::output::{plain_quote_line, value_line};
use pricetick_cli::presenter::PresenterOptions;
use pricetick_cli::{ui, LoadingSpinner, StreamPresenter};
use pricetick_core::cancel::CancellationToken;
use pricetick_core::{PollLoop, PriceFeed, PriceSource, TickerError};
use pricetick_feed::{BinanceFeed, RelayFeed};
use pricetick_server::{AppState, SharedSource};
use pricetick_tui::{TuiApp, TuiOptions, TuiPollObserver};
use tracing::{debug, info};

use crate::config::{AppConfig, Mode, Settings};
use crate::version;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        pricetick_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let settings = config.settings()?;
    let mode = config.mode(console::Term::stdout().is_term());
    debug!(
        version = %version::full_version(),
        ?mode,
        symbol = %settings.source.symbol,
        "starting"
    );

    match mode {
        Mode::Once => run_once(config, &settings),
        Mode::Serve(addr) => run_server(addr, &settings),
        Mode::Plain => run_plain(config, settings),
        Mode::Tui => run_tui(settings),
    }
}

/// The upstream feed chosen by the settings.
pub fn build_feed(settings: &Settings) -> Result<Box<dyn PriceFeed>> {
    let feed: Box<dyn PriceFeed> = if settings.relay {
        let feed = RelayFeed::new(&settings.feed)?;
        info!(url = feed.url(), "reading from relay");
        Box::new(feed)
    } else {
        let feed = BinanceFeed::new(settings.feed.clone())?;
        info!(url = %settings.feed.base_url, "reading from Binance");
        Box::new(feed)
    };
    Ok(feed)
}

fn build_source(settings: &Settings) -> Result<SharedSource> {
    let feed = build_feed(settings)?;
    Ok(Arc::new(PriceSource::new(feed, settings.source.clone())))
}

fn run_once(config: &AppConfig, settings: &Settings) -> Result<()> {
    let source = build_source(settings)?;
    let quote = source.get()?;
    if config.quiet {
        println!("{}", value_line(quote.value()));
    } else {
        println!("{}", plain_quote_line(&quote));
    }
    Ok(())
}

fn run_server(addr: SocketAddr, settings: &Settings) -> Result<()> {
    // Blocking HTTP clients own a runtime of their own and must be created
    // and dropped outside the async one.
    let source = build_source(settings)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let state = AppState::new(Arc::clone(&source));
    let served = runtime.block_on(pricetick_server::serve(addr, state));
    drop(runtime);
    drop(source);
    served?;
    Ok(())
}

fn run_plain(config: &AppConfig, settings: Settings) -> Result<()> {
    let cancel = CancellationToken::new();
    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc_handler(cancel.clone(), move || {
        let _ = stop_tx.try_send(());
    })?;

    let spinner = if config.quiet {
        LoadingSpinner::hidden()
    } else {
        LoadingSpinner::start(format!("fetching {}…", settings.source.symbol))
    };
    let presenter = StreamPresenter::stdout(PresenterOptions {
        quiet: config.quiet,
        colored: !config.quiet && ui::use_color(),
        animation: settings.animation.clone(),
    })
    .with_spinner(spinner);

    let source = build_source(&settings)?;
    let mut poll = PollLoop::spawn(
        settings.poll.clone(),
        move || source.get(),
        Arc::new(presenter),
    )?;

    // Returns once the handler fires.
    let _ = stop_rx.recv();
    poll.stop();
    cancel.check_cancelled()?;
    Ok(())
}

fn run_tui(settings: Settings) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut app = TuiApp::new(
        rx,
        TuiOptions {
            symbol: settings.source.symbol.clone(),
            animation: settings.animation.clone(),
            history_len: settings.history_len,
        },
    );

    let source = build_source(&settings)?;
    let observer = Arc::new(TuiPollObserver::new(tx));
    let mut poll = PollLoop::spawn(settings.poll.clone(), move || source.get(), observer)?;

    // Raw mode turns Ctrl+C into a key event, so no signal handler here.
    let result = app.run(&CancellationToken::new());
    poll.stop();
    result.context("TUI error")?;

    if app.cancelled {
        return Err(TickerError::Cancelled.into());
    }
    Ok(())
}

fn ctrlc_handler<F>(cancel: CancellationToken, on_signal: F) -> Result<()>
where
    F: Fn() + Send + 'static,
{
    ctrlc::set_handler(move || {
        cancel.cancel();
        on_signal();
    })
    .context("error setting Ctrl+C handler")
}
