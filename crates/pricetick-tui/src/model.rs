//! TUI application model (Elm architecture).

use std::io;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;
use tracing::debug;

use pricetick_core::cancel::CancellationToken;
use pricetick_core::constants::CHANGE_INDICATOR_DURATION;
use pricetick_core::format::{format_delta, format_price};
use pricetick_core::{AnimationConfig, DigitAnimator, History, PriceChange, Quote};

use crate::footer::render_footer;
use crate::header::{render_header, FeedStatus};
use crate::keymap::{map_key, KeyAction};
use crate::logs::{LogLevel, LogPanel};
use crate::messages::TuiMessage;
use crate::price::render_price;
use crate::sparkline::render_sparkline;
use crate::styles::ColorTheme;

/// Render interval while a transition is running.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Render interval while idle.
const IDLE_TICK: Duration = Duration::from_millis(250);

/// Log lines moved by PgUp/PgDn.
const PAGE_SIZE: usize = 10;

/// Terminal columns per sparkline point.
const SPARKLINE_SPACING: usize = 2;

/// Dashboard settings.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub symbol: String,
    pub animation: AnimationConfig,
    /// Fixed history length; `None` derives it from the sparkline width.
    pub history_len: Option<usize>,
}

/// TUI application state (Elm Model).
pub struct TuiApp {
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Whether the user cancelled with Ctrl+C.
    pub cancelled: bool,
    pub symbol: String,
    pub status: FeedStatus,
    /// Most recent quote.
    pub last_quote: Option<Quote>,
    /// Latest change and when it arrived.
    pub last_change: Option<(PriceChange, Instant)>,
    pub history: History,
    pub logs: LogPanel,
    pub show_logs: bool,
    pub show_sparkline: bool,
    pub terminal_width: u16,
    pub terminal_height: u16,
    animator: DigitAnimator,
    fixed_history: bool,
    theme: ColorTheme,
    rx: Receiver<TuiMessage>,
}

impl TuiApp {
    #[must_use]
    pub fn new(rx: Receiver<TuiMessage>, options: TuiOptions) -> Self {
        let fixed_history = options.history_len.is_some();
        let capacity = options
            .history_len
            .unwrap_or_else(|| History::capacity_for_width(80, SPARKLINE_SPACING));
        Self {
            should_quit: false,
            cancelled: false,
            symbol: options.symbol,
            status: FeedStatus::Loading,
            last_quote: None,
            last_change: None,
            history: History::new(capacity),
            logs: LogPanel::new(),
            show_logs: true,
            show_sparkline: true,
            terminal_width: 80,
            terminal_height: 24,
            animator: DigitAnimator::new(options.animation),
            fixed_history,
            theme: ColorTheme::default(),
            rx,
        }
    }

    /// The animator driving the price panel.
    #[must_use]
    pub fn animator(&self) -> &DigitAnimator {
        &self.animator
    }

    /// Drain pending messages (Elm Update).
    pub fn update(&mut self, now: Instant) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message_at(msg, now);
        }
    }

    /// Handle a single message at the current time.
    pub fn handle_message(&mut self, msg: TuiMessage) {
        self.handle_message_at(msg, Instant::now());
    }

    /// Handle a single message at `now`.
    pub fn handle_message_at(&mut self, msg: TuiMessage, now: Instant) {
        match msg {
            TuiMessage::Quote(quote) => self.on_quote(quote, now),
            TuiMessage::Change(change) => {
                self.animator
                    .start(Some(change.previous), change.current, now);
                self.last_change = Some((change, now));
                self.logs.push(
                    LogLevel::Info,
                    format!(
                        "{} {} -> {}",
                        change.trend().arrow(),
                        format_delta(change.delta()),
                        format_price(change.current)
                    ),
                );
            }
            TuiMessage::Failure(err) => {
                self.status = FeedStatus::Error;
                self.logs.push(LogLevel::Error, err);
            }
            TuiMessage::Log(line) => self.logs.push(LogLevel::Info, line),
            TuiMessage::Tick => {
                self.animator.tick(now);
            }
            TuiMessage::Resize { width, height } => self.resize(width, height),
            TuiMessage::KeyPress(action) => self.handle_key_action(action),
            TuiMessage::Quit => self.should_quit = true,
        }
    }

    fn on_quote(&mut self, quote: Quote, now: Instant) {
        let previous = self.status;
        self.status = if quote.is_stale() {
            FeedStatus::Stale
        } else {
            FeedStatus::Live
        };
        if self.status != previous {
            match self.status {
                FeedStatus::Stale => self
                    .logs
                    .push(LogLevel::Warn, "upstream failing, showing last known price"),
                FeedStatus::Live if previous == FeedStatus::Loading => self.logs.push(
                    LogLevel::Info,
                    format!("{} at {}", quote.sample.symbol, format_price(quote.value())),
                ),
                FeedStatus::Live => self.logs.push(LogLevel::Info, "feed recovered"),
                _ => {}
            }
        }
        if self.animator.frame().is_none() {
            self.animator.start(None, quote.value(), now);
        }
        self.history.push(quote.value());
        self.last_quote = Some(quote);
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
        if !self.fixed_history {
            let inner = usize::from(width.saturating_sub(2));
            self.history
                .resize(History::capacity_for_width(inner, SPARKLINE_SPACING));
        }
    }

    /// Handle a keyboard action.
    pub fn handle_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Cancel => {
                self.cancelled = true;
                self.should_quit = true;
            }
            KeyAction::ToggleLogs => self.show_logs = !self.show_logs,
            KeyAction::ToggleSparkline => self.show_sparkline = !self.show_sparkline,
            KeyAction::ScrollUp => self.logs.scroll_up(1),
            KeyAction::ScrollDown => self.logs.scroll_down(1),
            KeyAction::PageUp => self.logs.scroll_up(PAGE_SIZE),
            KeyAction::PageDown => self.logs.scroll_down(PAGE_SIZE),
            KeyAction::Home => self.logs.home(),
            KeyAction::End => self.logs.end(),
            KeyAction::None => {}
        }
    }

    /// The change indicator, visible for a short while after each change.
    #[must_use]
    pub fn change_indicator(&self, now: Instant) -> Option<&PriceChange> {
        self.last_change
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < CHANGE_INDICATOR_DURATION)
            .map(|(change, _)| change)
    }

    /// How long the event loop may wait before the next render.
    #[must_use]
    pub fn next_tick(&self) -> Duration {
        if self.animator.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_TICK
        }
    }

    /// Split the screen into header, price, sparkline, logs and footer.
    ///
    /// Hidden panels get a zero-height rect.
    #[must_use]
    pub fn compute_layout(&self, area: Rect) -> [Rect; 5] {
        let sparkline = if self.show_sparkline {
            Constraint::Min(4)
        } else {
            Constraint::Length(0)
        };
        let logs = match (self.show_logs, self.show_sparkline) {
            (false, _) => Constraint::Length(0),
            (true, true) => Constraint::Length(8),
            (true, false) => Constraint::Min(3),
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // header
                Constraint::Length(4), // price
                sparkline,
                logs,
                Constraint::Length(2), // footer
            ])
            .split(area);
        [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
    }

    /// Render the full TUI view at `now`.
    pub fn render_at(&self, frame: &mut ratatui::Frame, now: Instant) {
        let [header, price, sparkline, logs, footer] = self.compute_layout(frame.area());

        render_header(
            frame,
            header,
            &self.symbol,
            self.status,
            self.last_quote.as_ref().map(|q| q.sample.observed_at),
            &self.theme,
        );
        render_price(
            frame,
            price,
            self.animator.frame(),
            self.change_indicator(now),
            &self.theme,
        );
        if self.show_sparkline && sparkline.height > 0 {
            render_sparkline(frame, sparkline, &self.history, &self.theme);
        }
        if self.show_logs && logs.height > 0 {
            self.logs.render(frame, logs, &self.theme);
        }
        render_footer(frame, footer);
    }

    /// Set up the terminal for TUI mode.
    pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        Terminal::new(CrosstermBackend::new(stdout))
    }

    /// Tear down the terminal, restoring normal mode.
    pub fn teardown_terminal(
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Run the event loop until the user quits or `cancel` fires.
    ///
    /// The loop is the animator's frame clock: it renders every
    /// [`FRAME_INTERVAL`] while a transition runs and every [`IDLE_TICK`]
    /// otherwise.
    pub fn run(&mut self, cancel: &CancellationToken) -> io::Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let result = self.event_loop(&mut terminal, cancel);
        Self::teardown_terminal(&mut terminal)?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        cancel: &CancellationToken,
    ) -> io::Result<()> {
        let size = terminal.size()?;
        self.resize(size.width, size.height);

        loop {
            let now = Instant::now();
            self.update(now);
            self.animator.tick(now);
            terminal.draw(|frame| self.render_at(frame, now))?;

            if self.should_quit || cancel.is_cancelled() {
                debug!(cancelled = self.cancelled, "leaving dashboard");
                break;
            }

            if event::poll(self.next_tick())? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_action(map_key(key));
                    }
                    Event::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
