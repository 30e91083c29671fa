#![no_main]

use libfuzzer_sys::fuzz_target;

use pricetick_core::format::{format_delta, format_price, DECIMAL_POINT};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let value = f64::from_le_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ]);

    let text = format_price(value);
    let _ = format_delta(value);
    if value.is_finite() {
        // Exactly two fraction digits after the only decimal point.
        let (_, fraction) = text.split_once(DECIMAL_POINT).expect("missing decimal point");
        assert_eq!(fraction.len(), 2);
        assert!(fraction.bytes().all(|b| b.is_ascii_digit()));
    }
});
