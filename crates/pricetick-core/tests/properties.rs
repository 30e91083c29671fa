//! Property-based tests for the animator, history buffer and sparkline.

use std::time::Duration;

use proptest::prelude::*;

use pricetick_core::animator::{AnimationConfig, Transition};
use pricetick_core::highlight::HighlightPolicy;
use pricetick_core::history::History;
use pricetick_core::sparkline::{self, Tone};
use pricetick_core::Trend;

fn price() -> impl Strategy<Value = f64> {
    // Whole cents, as the upstream quotes them.
    (1u64..10_000_000_000).prop_map(|cents| {
        #[allow(clippy::cast_precision_loss)]
        let value = cents as f64 / 100.0;
        value
    })
}

fn policy() -> impl Strategy<Value = HighlightPolicy> {
    prop_oneof![
        Just(HighlightPolicy::Accumulate),
        Just(HighlightPolicy::FromFirstDivergence),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Equal previous and current never animate.
    #[test]
    fn equal_values_never_animate(v in price(), policy in policy()) {
        let config = AnimationConfig { policy, ..AnimationConfig::default() };
        prop_assert!(Transition::new(Some(v), v, &config).is_none());
    }

    /// The last frame lands exactly on the target, with progress monotonic.
    #[test]
    fn converges_to_current(
        prev in price(),
        cur in price(),
        step_ms in 1u64..400,
        policy in policy(),
    ) {
        prop_assume!(prev.to_bits() != cur.to_bits());
        let config = AnimationConfig { policy, ..AnimationConfig::default() };
        let transition = Transition::new(Some(prev), cur, &config).unwrap();
        let frames: Vec<_> = transition
            .frames((0..).map(|i| Duration::from_millis(i * step_ms)))
            .collect();

        let last = frames.last().unwrap();
        prop_assert!(last.is_final());
        prop_assert_eq!(last.value.to_bits(), cur.to_bits());
        prop_assert_eq!(last.trend, Trend::between(prev, cur));
        for pair in frames.windows(2) {
            prop_assert!(pair[1].progress >= pair[0].progress);
        }
    }

    /// Highlights depend only on the inputs and the policy.
    #[test]
    fn highlights_are_deterministic(prev in price(), cur in price(), policy in policy()) {
        prop_assume!(prev.to_bits() != cur.to_bits());
        let config = AnimationConfig { policy, ..AnimationConfig::default() };
        let a = pricetick_core::settle(Some(prev), cur, &config).unwrap();
        let b = pricetick_core::settle(Some(prev), cur, &config).unwrap();
        prop_assert_eq!(a.highlights, b.highlights);
    }

    /// The buffer never exceeds its capacity and starts full.
    #[test]
    fn history_is_bounded(
        capacity in 2usize..64,
        values in prop::collection::vec(price(), 1..200),
    ) {
        let mut history = History::new(capacity);
        history.push(values[0]);
        prop_assert_eq!(history.len(), capacity);
        for &v in &values[1..] {
            history.push(v);
            prop_assert!(history.len() <= capacity);
        }
        prop_assert_eq!(history.latest(), values.last().copied());
    }

    /// Strictly increasing data renders entirely in the positive tone.
    #[test]
    fn increasing_history_is_positive(
        start in price(),
        steps in prop::collection::vec(1u32..10_000, 1..64),
    ) {
        let mut values = vec![start];
        for s in steps {
            let next = values[values.len() - 1] + f64::from(s);
            values.push(next);
        }
        let segments = sparkline::render(&values, 120.0, 30.0);
        prop_assert_eq!(segments.len(), values.len() - 1);
        prop_assert!(segments.iter().all(|s| s.tone == Tone::Positive));
    }

    /// Constant data renders entirely in the default tone.
    #[test]
    fn constant_history_is_default_tone(v in price(), len in 2usize..64) {
        let values = vec![v; len];
        let segments = sparkline::render(&values, 120.0, 30.0);
        prop_assert!(segments.iter().all(|s| s.tone == Tone::default()));
        prop_assert!(segments.iter().all(|s| s.trend == Trend::Flat));
    }
}
