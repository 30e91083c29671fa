#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;

use pricetick_core::highlight::HighlightPolicy;
use pricetick_core::{AnimationConfig, Transition};

fuzz_target!(|data: &[u8]| {
    if data.len() < 19 {
        return;
    }
    let from = f64::from_le_bytes(data[0..8].try_into().unwrap());
    let to = f64::from_le_bytes(data[8..16].try_into().unwrap());
    let policy = if data[16] % 2 == 0 {
        HighlightPolicy::Accumulate
    } else {
        HighlightPolicy::FromFirstDivergence
    };
    let duration = Duration::from_millis(u64::from(u16::from_le_bytes([data[17], data[18]])));
    let config = AnimationConfig {
        duration,
        policy,
        ..AnimationConfig::default()
    };

    let Some(mut transition) = Transition::new(Some(from), to, &config) else {
        return;
    };
    // Progress never regresses and the last frame lands on the target.
    let step = duration / 16;
    let ticks = (0..=16).map(|i| step * i);
    let mut last = 0.0;
    for frame in transition.clone().frames(ticks) {
        assert!(frame.progress >= last);
        last = frame.progress;
        assert_eq!(frame.mask().len(), frame.text.chars().count());
    }
    assert_eq!(transition.frame_at(duration).value.to_bits(), to.to_bits());
});
