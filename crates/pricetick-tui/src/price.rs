//! Animated price panel and change indicator.

use pricetick_core::format::{format_delta, DECIMAL_POINT};
use pricetick_core::{Frame as PriceFrame, PriceChange, Trend};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::styles::ColorTheme;

/// Styled spans for one animation frame.
///
/// Highlighted characters take the trend color; fraction digits that are
/// not highlighted are dimmed; the decimal point is emboldened while
/// pulsing.
#[must_use]
pub fn price_line(frame: &PriceFrame, theme: &ColorTheme) -> Line<'static> {
    let mask = frame.mask();
    let accent = theme.trend_color(frame.trend);
    let mut in_fraction = false;
    let spans: Vec<Span<'static>> = frame
        .text
        .chars()
        .zip(mask)
        .map(|(c, highlighted)| {
            let mut style = if highlighted {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else if in_fraction {
                theme.muted_style()
            } else {
                theme.text_style()
            };
            if c == DECIMAL_POINT {
                in_fraction = true;
                if frame.pulse {
                    style = style.fg(accent).add_modifier(Modifier::BOLD);
                }
            }
            Span::styled(c.to_string(), style)
        })
        .collect();
    Line::from(spans)
}

/// `▲ +0.95` style indicator for a change.
#[must_use]
pub fn change_line(change: &PriceChange, theme: &ColorTheme) -> Line<'static> {
    let trend = change.trend();
    Line::from(Span::styled(
        format!("{} {}", trend.arrow(), format_delta(change.delta())),
        Style::default().fg(theme.trend_color(trend)),
    ))
}

/// Render the price panel.
///
/// Without a frame the panel shows a loading placeholder.
pub fn render_price(
    frame: &mut Frame,
    area: Rect,
    current: Option<&PriceFrame>,
    indicator: Option<&PriceChange>,
    theme: &ColorTheme,
) {
    let mut lines = Vec::with_capacity(2);
    match current {
        Some(price) => {
            let mut line = price_line(price, theme);
            if price.trend != Trend::Flat && !price.is_final() {
                line.spans.push(Span::styled(
                    format!(" {}", price.trend.arrow()),
                    Style::default().fg(theme.trend_color(price.trend)),
                ));
            }
            lines.push(line);
        }
        None => lines.push(Line::styled("loading…", theme.muted_style())),
    }
    lines.push(indicator.map_or_else(Line::default, |c| change_line(c, theme)));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(" Price "),
    );
    frame.render_widget(paragraph, area);
}
