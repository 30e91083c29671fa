//! Trend sparkline geometry.
//!
//! [`render`] turns a price history into cubic Bézier segments in viewport
//! coordinates (origin top-left, y grows downwards). Surfaces either sample
//! the curves with [`CurveSegment::flatten`] or hand them to a vector
//! renderer through [`svg_path`].

use std::fmt::Write as _;

use crate::Trend;

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Segment color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Positive,
    Negative,
}

/// Cubic Bézier between two consecutive history points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
    pub trend: Trend,
    pub tone: Tone,
}

impl CurveSegment {
    fn between(start: Point, end: Point, trend: Trend, tone: Tone) -> Self {
        let half = (end.x - start.x) / 2.0;
        Self {
            start,
            control1: Point::new(start.x + half, start.y),
            control2: Point::new(end.x - half, end.y),
            end,
            trend,
            tone,
        }
    }

    /// Point on the curve at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// `steps + 1` evenly spaced points from `start` to `end` inclusive.
    #[must_use]
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        #[allow(clippy::cast_precision_loss)]
        let n = steps as f64;
        (0..=steps)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 / n;
                self.point_at(t)
            })
            .collect()
    }
}

/// Curve segments for `values` drawn into a `width` x `height` viewport.
///
/// Returns nothing for fewer than two values, any non-finite value, or a
/// viewport without a positive finite size.
#[must_use]
pub fn render(values: &[f64], width: f64, height: f64) -> Vec<CurveSegment> {
    let viewport_ok = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
    if values.len() < 2 || !viewport_ok || values.iter().any(|v| !v.is_finite()) {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Halved so that extreme finite inputs cannot overflow the span.
    let (min, max) = (min / 2.0, max / 2.0);
    let range = if max > min { max - min } else { 1.0 };
    #[allow(clippy::cast_precision_loss)]
    let last = (values.len() - 1) as f64;

    let point = |i: usize, v: f64| {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f64 / last * width;
        Point::new(x, height - (v / 2.0 - min) / range * height)
    };

    let mut tone = Tone::default();
    values
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let trend = Trend::between(pair[0], pair[1]);
            tone = match trend {
                Trend::Up => Tone::Positive,
                Trend::Down => Tone::Negative,
                Trend::Flat => tone,
            };
            CurveSegment::between(point(i, pair[0]), point(i + 1, pair[1]), trend, tone)
        })
        .collect()
}

/// SVG path data (`M ... C ...`) for a run of segments.
#[must_use]
pub fn svg_path(segments: &[CurveSegment]) -> String {
    let Some(first) = segments.first() else {
        return String::new();
    };
    let mut path = format!("M{:.2},{:.2}", first.start.x, first.start.y);
    for s in segments {
        // Writing to a String cannot fail.
        let _ = write!(
            path,
            " C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            s.control1.x, s.control1.y, s.control2.x, s.control2.y, s.end.x, s.end.y
        );
    }
    path
}
