#![no_main]

use libfuzzer_sys::fuzz_target;

use pricetick_core::sparkline;

fuzz_target!(|data: &[u8]| {
    let values: Vec<f64> = data
        .chunks_exact(8)
        .take(256)
        .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
        .collect();

    let segments = sparkline::render(&values, 200.0, 40.0);
    if !segments.is_empty() {
        assert_eq!(segments.len(), values.len() - 1);
        for segment in &segments {
            for point in segment.flatten(4) {
                assert!(point.x.is_finite() && point.y.is_finite());
            }
        }
    }
    let _ = sparkline::svg_path(&segments);
});
