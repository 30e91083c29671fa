//! TUI header panel.

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::styles::ColorTheme;

/// Connection state shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No quote yet.
    Loading,
    /// Last quote was fresh or within the TTL.
    Live,
    /// Last quote was served from an expired cache.
    Stale,
    /// The last poll produced nothing.
    Error,
}

impl FeedStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "LOADING",
            Self::Live => "LIVE",
            Self::Stale => "STALE",
            Self::Error => "ERROR",
        }
    }

    fn style(self, theme: &ColorTheme) -> Style {
        let color = match self {
            Self::Loading => theme.muted,
            Self::Live => theme.positive,
            Self::Stale => theme.warning,
            Self::Error => theme.negative,
        };
        Style::default().fg(color)
    }
}

/// Render the header panel.
pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    symbol: &str,
    status: FeedStatus,
    updated: Option<DateTime<Utc>>,
    theme: &ColorTheme,
) {
    let mut spans = vec![
        Span::styled("pricetick", theme.header_style()),
        Span::raw(format!(" | {symbol} | ")),
        Span::styled(status.label(), status.style(theme)),
    ];
    if let Some(at) = updated {
        spans.push(Span::styled(
            format!(" | updated {}", at.with_timezone(&Local).format("%H:%M:%S")),
            theme.muted_style(),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
