//! Trend sparkline drawn on a Braille canvas.

use pricetick_core::sparkline::{self, CurveSegment, Tone};
use pricetick_core::History;
use ratatui::layout::Rect;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::styles::ColorTheme;

/// Samples per curve segment when rasterizing.
const FLATTEN_STEPS: usize = 8;

/// Braille dots per terminal cell, horizontally and vertically.
const DOTS_X: f64 = 2.0;
const DOTS_Y: f64 = 4.0;

/// Sampled curves in canvas coordinates (origin bottom-left).
#[must_use]
pub fn polylines(
    segments: &[CurveSegment],
    height: f64,
    steps: usize,
) -> Vec<(Tone, Vec<(f64, f64)>)> {
    segments
        .iter()
        .map(|segment| {
            let points = segment
                .flatten(steps)
                .into_iter()
                .map(|p| (p.x, height - p.y))
                .collect();
            (segment.tone, points)
        })
        .collect()
}

/// Render the sparkline panel for `history`.
pub fn render_sparkline(frame: &mut Frame, area: Rect, history: &History, theme: &ColorTheme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Trend ");
    let inner = block.inner(area);
    if inner.width == 0 || inner.height == 0 {
        frame.render_widget(block, area);
        return;
    }

    let width = f64::from(inner.width) * DOTS_X;
    let height = f64::from(inner.height) * DOTS_Y;
    let segments = sparkline::render(&history.to_vec(), width, height);
    let curves = polylines(&segments, height, FLATTEN_STEPS);
    let positive = theme.tone_color(Tone::Positive);
    let negative = theme.tone_color(Tone::Negative);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for (tone, points) in &curves {
                let color = match tone {
                    Tone::Positive => positive,
                    Tone::Negative => negative,
                };
                for pair in points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color,
                    });
                }
            }
        });
    frame.render_widget(canvas, area);
}
