//! Digit-level animated transitions between two prices.
//!
//! A [`Transition`] is a pure function of elapsed time: it eases the
//! displayed value from the previous price to the current one and tracks
//! which characters of the formatted string changed. [`DigitAnimator`] is
//! the state machine a rendering loop drives with its own frame clock; it
//! holds at most one active transition and starting a new one abandons the
//! old one.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::constants::{DEFAULT_ANIMATION_DURATION, DEFAULT_PULSE_DURATION};
use crate::format::format_price;
use crate::highlight::{changed_digits, from_first_divergence, HighlightPolicy, HighlightSet};
use crate::Trend;

/// Interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Quadratic ease-out, `t * (2 - t)`.
    #[default]
    QuadOut,
    /// Constant rate.
    Linear,
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress in `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::QuadOut => t * (2.0 - t),
            Self::Linear => t,
        }
    }
}

/// Animation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Time from start to convergence.
    pub duration: Duration,
    pub easing: Easing,
    pub policy: HighlightPolicy,
    /// How long the decimal point pulses after a transition starts.
    pub pulse: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ANIMATION_DURATION,
            easing: Easing::default(),
            policy: HighlightPolicy::default(),
            pulse: DEFAULT_PULSE_DURATION,
        }
    }
}

/// One displayed state of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Interpolated numeric value.
    pub value: f64,
    /// `value` in canonical formatting.
    pub text: String,
    /// Highlighted character indices of `text`.
    pub highlights: HighlightSet,
    pub trend: Trend,
    /// Linear progress in `[0, 1]`.
    pub progress: f64,
    /// Whether the decimal point is pulsing.
    pub pulse: bool,
}

impl Frame {
    /// True for the frame that lands on the target value.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.progress >= 1.0
    }

    /// Per-character highlight mask of `text`.
    #[must_use]
    pub fn mask(&self) -> Vec<bool> {
        self.highlights.mask(&self.text)
    }
}

/// An eased move from one price to another.
#[derive(Debug, Clone)]
pub struct Transition {
    from: f64,
    to: f64,
    trend: Trend,
    start_text: String,
    instant: bool,
    config: AnimationConfig,
    highlights: HighlightSet,
    progress: f64,
}

impl Transition {
    /// Plan a transition from `previous` to `current`.
    ///
    /// Returns `None` when there is nothing to animate: the values are equal
    /// or `current` is not a finite number. Without a previous value the
    /// transition is a single final frame showing `current`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn new(previous: Option<f64>, current: f64, config: &AnimationConfig) -> Option<Self> {
        if !current.is_finite() || previous == Some(current) {
            return None;
        }
        let Some(from) = previous.filter(|p| p.is_finite()) else {
            return Some(Self {
                from: current,
                to: current,
                trend: Trend::Flat,
                start_text: format_price(current),
                instant: true,
                config: config.clone(),
                highlights: HighlightSet::new(),
                progress: 0.0,
            });
        };

        let start_text = format_price(from);
        let highlights = match config.policy {
            HighlightPolicy::FromFirstDivergence => {
                from_first_divergence(&start_text, &format_price(current))
            }
            HighlightPolicy::Accumulate => HighlightSet::new(),
        };
        Some(Self {
            from,
            to: current,
            trend: Trend::between(from, current),
            start_text,
            instant: config.duration.is_zero(),
            config: config.clone(),
            highlights,
            progress: 0.0,
        })
    }

    /// Value the transition converges on.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[must_use]
    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Linear progress reached so far.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Frame displayed `elapsed` after the transition started.
    ///
    /// Progress never moves backwards, even if `elapsed` does.
    pub fn frame_at(&mut self, elapsed: Duration) -> Frame {
        let raw = if self.instant {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.config.duration.as_secs_f64()).min(1.0)
        };
        let progress = raw.max(self.progress);
        self.progress = progress;

        let value = if progress >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * self.config.easing.apply(progress)
        };
        let text = format_price(value);
        if self.config.policy == HighlightPolicy::Accumulate {
            self.highlights
                .extend(changed_digits(&self.start_text, &text));
        }

        Frame {
            value,
            text,
            highlights: self.highlights.clone(),
            trend: self.trend,
            progress,
            pulse: !self.instant
                && self.trend != Trend::Flat
                && elapsed < self.config.pulse.min(self.config.duration),
        }
    }

    /// Lazily produce frames for each tick of an external clock.
    ///
    /// `ticks` yields elapsed times since the start; the iterator ends after
    /// the final frame or when `ticks` runs out.
    pub fn frames<I>(self, ticks: I) -> Frames<I::IntoIter>
    where
        I: IntoIterator<Item = Duration>,
    {
        Frames {
            transition: self,
            ticks: ticks.into_iter(),
            done: false,
        }
    }
}

/// Iterator returned by [`Transition::frames`].
#[derive(Debug)]
pub struct Frames<I> {
    transition: Transition,
    ticks: I,
    done: bool,
}

impl<I: Iterator<Item = Duration>> Iterator for Frames<I> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }
        let elapsed = self.ticks.next()?;
        let frame = self.transition.frame_at(elapsed);
        self.done = frame.is_final();
        Some(frame)
    }
}

struct Running {
    transition: Transition,
    started_at: Instant,
}

/// Single-transition animation state machine.
pub struct DigitAnimator {
    config: AnimationConfig,
    active: Option<Running>,
    frame: Option<Frame>,
    generation: u64,
}

impl DigitAnimator {
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            active: None,
            frame: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Start animating from `previous` to `current` at `now`.
    ///
    /// Any running transition is abandoned. Returns false, leaving the
    /// animator untouched, when there is nothing to animate.
    pub fn start(&mut self, previous: Option<f64>, current: f64, now: Instant) -> bool {
        let Some(mut transition) = Transition::new(previous, current, &self.config) else {
            return false;
        };
        self.generation += 1;
        trace!(
            generation = self.generation,
            ?previous,
            current,
            "starting transition"
        );
        let first = transition.frame_at(Duration::ZERO);
        self.active = if first.is_final() {
            None
        } else {
            Some(Running {
                transition,
                started_at: now,
            })
        };
        self.frame = Some(first);
        true
    }

    /// Advance the active transition to `now`.
    ///
    /// Returns the new frame, or `None` when nothing is animating.
    pub fn tick(&mut self, now: Instant) -> Option<&Frame> {
        let running = self.active.as_mut()?;
        let elapsed = now.saturating_duration_since(running.started_at);
        let frame = running.transition.frame_at(elapsed);
        if frame.is_final() {
            self.active = None;
        }
        self.frame = Some(frame);
        self.frame.as_ref()
    }

    /// Abandon the active transition, keeping the last frame on display.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            self.generation += 1;
        }
    }

    /// The most recent frame.
    #[must_use]
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Incremented whenever a transition starts or is cancelled.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
