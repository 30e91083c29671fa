//! Application configuration from CLI flags and environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use pricetick_core::constants::{DEFAULT_PULSE_DURATION, DEFAULT_SYMBOL};
use pricetick_core::{
    AnimationConfig, Easing, HighlightPolicy, PollConfig, SourceConfig, TickerError,
};
use pricetick_feed::config::BINANCE_BASE_URL;
use pricetick_feed::FeedConfig;

/// pricetick: live price ticker with animated digit changes.
#[derive(Parser, Debug)]
#[command(name = "pricetick", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Trading pair to track.
    #[arg(short, long, default_value = DEFAULT_SYMBOL, env = "PRICETICK_SYMBOL")]
    pub symbol: String,

    /// Binance REST base URL.
    #[arg(long, default_value = BINANCE_BASE_URL, env = "PRICETICK_ENDPOINT")]
    pub endpoint: String,

    /// Read quotes from a pricetick relay at this base URL instead of Binance.
    #[arg(long, env = "PRICETICK_RELAY")]
    pub relay: Option<String>,

    /// Cache lifetime (e.g. "1000ms", "1s").
    #[arg(long, default_value = "1000ms", env = "PRICETICK_TTL")]
    pub ttl: String,

    /// Delay between polls.
    #[arg(long, default_value = "2s", env = "PRICETICK_INTERVAL")]
    pub interval: String,

    /// Upstream request timeout.
    #[arg(long, default_value = "10s", env = "PRICETICK_TIMEOUT")]
    pub timeout: String,

    /// Digit animation duration.
    #[arg(long, default_value = "3000ms", env = "PRICETICK_DURATION")]
    pub duration: String,

    /// Animation easing curve.
    #[arg(long, value_enum, default_value_t = EasingArg::QuadOut)]
    pub easing: EasingArg,

    /// How changed digits are highlighted.
    #[arg(long, value_enum, default_value_t = HighlightArg::Accumulate)]
    pub highlight: HighlightArg,

    /// Sparkline points kept (0 derives it from the terminal width).
    #[arg(long, default_value = "0", env = "PRICETICK_HISTORY")]
    pub history: usize,

    /// Stream plain lines instead of the dashboard.
    #[arg(long)]
    pub plain: bool,

    /// Fetch one quote, print it and exit.
    #[arg(long)]
    pub once: bool,

    /// Run the HTTP relay on this address (e.g. "127.0.0.1:8080").
    #[arg(long, env = "PRICETICK_SERVE")]
    pub serve: Option<SocketAddr>,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only output the price).
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EasingArg {
    QuadOut,
    Linear,
}

impl From<EasingArg> for Easing {
    fn from(arg: EasingArg) -> Self {
        match arg {
            EasingArg::QuadOut => Self::QuadOut,
            EasingArg::Linear => Self::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HighlightArg {
    Accumulate,
    FromFirstDivergence,
}

impl From<HighlightArg> for HighlightPolicy {
    fn from(arg: HighlightArg) -> Self {
        match arg {
            HighlightArg::Accumulate => Self::Accumulate,
            HighlightArg::FromFirstDivergence => Self::FromFirstDivergence,
        }
    }
}

/// What the process does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Once,
    Serve(SocketAddr),
    Plain,
    Tui,
}

/// Validated settings for every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceConfig,
    pub poll: PollConfig,
    pub animation: AnimationConfig,
    pub feed: FeedConfig,
    /// Read from a relay rather than Binance.
    pub relay: bool,
    /// Fixed sparkline length, if configured.
    pub history_len: Option<usize>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Mode selected by the flags. Without a terminal on stdout the
    /// dashboard falls back to plain output.
    #[must_use]
    pub fn mode(&self, interactive: bool) -> Mode {
        if let Some(addr) = self.serve {
            Mode::Serve(addr)
        } else if self.once {
            Mode::Once
        } else if self.plain || !interactive {
            Mode::Plain
        } else {
            Mode::Tui
        }
    }

    /// Validate the flags and convert them into component settings.
    pub fn settings(&self) -> Result<Settings, TickerError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TickerError::Config("symbol must not be empty".into()));
        }
        let ttl = duration_arg("ttl", &self.ttl)?;
        let interval = duration_arg("interval", &self.interval)?;
        if interval.is_zero() {
            return Err(TickerError::Config("interval must be positive".into()));
        }
        let timeout = duration_arg("timeout", &self.timeout)?;
        if timeout.is_zero() {
            return Err(TickerError::Config("timeout must be positive".into()));
        }
        let duration = duration_arg("duration", &self.duration)?;

        let base_url = self.relay.clone().unwrap_or_else(|| self.endpoint.clone());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(TickerError::Config(format!("not an http(s) URL: {base_url}")));
        }

        Ok(Settings {
            source: SourceConfig { symbol, ttl },
            poll: PollConfig { delay: interval },
            animation: AnimationConfig {
                duration,
                easing: self.easing.into(),
                policy: self.highlight.into(),
                pulse: DEFAULT_PULSE_DURATION.min(duration),
            },
            feed: FeedConfig {
                base_url,
                timeout,
                ..FeedConfig::default()
            },
            relay: self.relay.is_some(),
            history_len: (self.history > 0).then_some(self.history),
        })
    }
}

fn duration_arg(name: &str, value: &str) -> Result<Duration, TickerError> {
    parse_duration(value)
        .ok_or_else(|| TickerError::Config(format!("invalid --{name} duration: {value:?}")))
}

/// Parse a duration string like "500ms", "30s", "5m", "1h". A bare number
/// is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}
