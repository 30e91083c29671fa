//! Scrollable log panel.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::styles::ColorTheme;

/// Entries kept before the oldest is dropped.
pub const MAX_LOG_ENTRIES: usize = 500;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub text: String,
}

/// Bounded log buffer with a scroll position.
///
/// While following, the view sticks to the newest entry; scrolling up
/// detaches it until the bottom is reached again.
#[derive(Debug, Clone)]
pub struct LogPanel {
    entries: VecDeque<LogEntry>,
    offset: usize,
    follow: bool,
}

impl LogPanel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            offset: 0,
            follow: true,
        }
    }

    pub fn push(&mut self, level: LogLevel, text: impl Into<String>) {
        self.entries.push_back(LogEntry {
            at: Local::now(),
            level,
            text: text.into(),
        });
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.pop_front();
            self.offset = self.offset.saturating_sub(1);
        }
        if self.follow {
            self.offset = self.last_index();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Index of the first visible entry.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let last = self.last_index();
        self.offset = (self.offset + lines).min(last);
        if self.offset == last {
            self.follow = true;
        }
    }

    pub fn home(&mut self) {
        self.follow = false;
        self.offset = 0;
    }

    pub fn end(&mut self) {
        self.follow = true;
        self.offset = self.last_index();
    }

    fn last_index(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Render the panel into `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &ColorTheme) {
        let visible = usize::from(area.height.saturating_sub(2));
        // Following keeps the newest entry on the last visible row.
        let first = if self.follow {
            self.entries.len().saturating_sub(visible)
        } else {
            self.offset
        };

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(first)
            .take(visible)
            .map(|entry| {
                let style = match entry.level {
                    LogLevel::Info => theme.text_style(),
                    LogLevel::Warn => Style::default().fg(theme.warning),
                    LogLevel::Error => Style::default().fg(theme.negative),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", entry.at.format("%H:%M:%S")),
                        theme.muted_style(),
                    ),
                    Span::styled(entry.text.clone(), style),
                ]))
            })
            .collect();

        let title = if self.follow {
            " Logs ".to_string()
        } else {
            format!(" Logs ({}/{}) ", self.offset + 1, self.entries.len())
        };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(theme.muted_style()),
        );
        frame.render_widget(list, area);
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn filled(n: usize) -> LogPanel {
        let mut panel = LogPanel::new();
        for i in 0..n {
            panel.push(LogLevel::Info, format!("line {i}"));
        }
        panel
    }

    fn screen(panel: &LogPanel, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let buf = terminal
            .draw(|frame| {
                let area = frame.area();
                panel.render(frame, area, &ColorTheme::default());
            })
            .unwrap();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf.buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn follows_new_entries() {
        let panel = filled(10);
        assert!(panel.is_following());
        assert_eq!(panel.offset(), 9);
    }

    #[test]
    fn caps_entries() {
        let panel = filled(MAX_LOG_ENTRIES + 10);
        assert_eq!(panel.len(), MAX_LOG_ENTRIES);
        assert_eq!(panel.entries().next().unwrap().text, "line 10");
    }

    #[test]
    fn scroll_up_detaches() {
        let mut panel = filled(10);
        panel.scroll_up(3);
        assert!(!panel.is_following());
        assert_eq!(panel.offset(), 6);
        panel.push(LogLevel::Info, "new");
        assert_eq!(panel.offset(), 6);
    }

    #[test]
    fn scroll_down_to_bottom_reattaches() {
        let mut panel = filled(10);
        panel.home();
        assert_eq!(panel.offset(), 0);
        panel.scroll_down(100);
        assert!(panel.is_following());
        assert_eq!(panel.offset(), 9);
    }

    #[test]
    fn end_reattaches() {
        let mut panel = filled(5);
        panel.scroll_up(1);
        panel.end();
        assert!(panel.is_following());
    }

    #[test]
    fn empty_panel_scrolls_safely() {
        let mut panel = LogPanel::new();
        panel.scroll_up(5);
        panel.scroll_down(5);
        assert_eq!(panel.offset(), 0);
    }

    #[test]
    fn renders_tail_when_following() {
        let panel = filled(20);
        let rows = screen(&panel, 40, 5);
        // Three visible rows inside the border.
        assert!(rows[1].contains("line 17"));
        assert!(rows[3].contains("line 19"));
    }

    #[test]
    fn renders_from_offset_when_scrolled() {
        let mut panel = filled(20);
        panel.home();
        let rows = screen(&panel, 40, 5);
        assert!(rows[1].contains("line 0"));
        assert!(rows[0].contains("1/20"));
    }
}
