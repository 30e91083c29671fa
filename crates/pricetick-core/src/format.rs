//! Canonical price formatting.
//!
//! Highlight indices are computed over the strings produced here, so the
//! layout (grouping separator, decimal point, fraction digits) is part of
//! the animator's contract.

use crate::constants::PRICE_DECIMALS;

/// Thousands grouping separator.
pub const GROUP_SEPARATOR: char = ',';

/// Decimal point.
pub const DECIMAL_POINT: char = '.';

/// Format a price with two fraction digits and thousands separators.
///
/// ```
/// use pricetick_core::format::format_price;
///
/// assert_eq!(format_price(50_001.07), "50,001.07");
/// assert_eq!(format_price(0.5), "0.50");
/// ```
#[must_use]
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.*}", PRICE_DECIMALS, value.abs());
    let (int_part, frac_part) = fixed.split_once(DECIMAL_POINT).unwrap_or((&fixed, ""));

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push(DECIMAL_POINT);
        out.push_str(frac_part);
    }
    out
}

/// Format a signed price change, always carrying a sign unless zero.
///
/// ```
/// use pricetick_core::format::format_delta;
///
/// assert_eq!(format_delta(0.95), "+0.95");
/// assert_eq!(format_delta(-1234.5), "-1,234.50");
/// ```
#[must_use]
pub fn format_delta(delta: f64) -> String {
    let magnitude = format_price(delta.abs());
    if magnitude.bytes().all(|b| matches!(b, b'0' | b'.' | b',')) {
        magnitude
    } else if delta > 0.0 {
        format!("+{magnitude}")
    } else {
        format!("-{magnitude}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_price(1.0), "1.00");
        assert_eq!(format_price(999.99), "999.99");
        assert_eq!(format_price(1_000.0), "1,000.00");
        assert_eq!(format_price(50_000.12), "50,000.12");
        assert_eq!(format_price(1_234_567.891), "1,234,567.89");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_price(0.004), "0.00");
        assert_eq!(format_price(2.999), "3.00");
        assert_eq!(format_price(999.999), "1,000.00");
    }

    #[test]
    fn negative_values() {
        assert_eq!(format_price(-1_500.25), "-1,500.25");
        assert_eq!(format_price(-0.001), "0.00");
    }

    #[test]
    fn non_finite_values_do_not_panic() {
        assert_eq!(format_price(f64::NAN), "NaN");
        assert_eq!(format_price(f64::INFINITY), "inf");
    }

    #[test]
    fn delta_signs() {
        assert_eq!(format_delta(0.0), "0.00");
        assert_eq!(format_delta(0.001), "0.00");
        assert_eq!(format_delta(12.3), "+12.30");
        assert_eq!(format_delta(-0.95), "-0.95");
    }
}
