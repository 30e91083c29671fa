//! Line formatting for plain (non-interactive) output.

use chrono::Local;
use console::style;
use pricetick_core::format::{format_delta, format_price, DECIMAL_POINT};
use pricetick_core::{Freshness, Frame, PriceChange, Quote, Trend};

/// Bracketed tag for non-fresh quotes, empty otherwise.
#[must_use]
pub fn freshness_tag(freshness: Freshness) -> &'static str {
    match freshness {
        Freshness::Fresh => "",
        Freshness::Cached => "[cached]",
        Freshness::Stale => "[stale]",
    }
}

/// The frame text with changed digits styled.
///
/// Highlighted characters take the trend color in bold, unchanged fraction
/// digits are dimmed. Without color the text is returned as is.
#[must_use]
pub fn highlighted_price(frame: &Frame, colored: bool) -> String {
    if !colored {
        return frame.text.clone();
    }
    let mut out = String::with_capacity(frame.text.len() * 4);
    let mut in_fraction = false;
    for (c, highlighted) in frame.text.chars().zip(frame.mask()) {
        if c == DECIMAL_POINT {
            in_fraction = true;
        }
        let styled = if highlighted {
            match frame.trend {
                Trend::Up => style(c).green().bold(),
                Trend::Down => style(c).red().bold(),
                Trend::Flat => style(c).bold(),
            }
        } else if in_fraction {
            style(c).dim()
        } else {
            style(c)
        };
        out.push_str(&styled.to_string());
    }
    out
}

/// `▲ +0.95` for a change, colored by direction.
#[must_use]
pub fn change_text(change: &PriceChange, colored: bool) -> String {
    let trend = change.trend();
    let text = format!("{} {}", trend.arrow(), format_delta(change.delta()));
    if !colored {
        return text;
    }
    match trend {
        Trend::Up => style(text).green().to_string(),
        Trend::Down => style(text).red().to_string(),
        Trend::Flat => text,
    }
}

/// One display line: local time, symbol, price, optional change and tag.
#[must_use]
pub fn quote_line(
    quote: &Quote,
    price: &str,
    change: Option<&PriceChange>,
    colored: bool,
) -> String {
    let time = quote.sample.observed_at.with_timezone(&Local).format("%H:%M:%S");
    let mut line = format!("{time}  {}  {price}", quote.sample.symbol);
    if let Some(change) = change {
        line.push_str("  ");
        line.push_str(&change_text(change, colored));
    }
    let tag = freshness_tag(quote.freshness);
    if !tag.is_empty() {
        line.push_str("  ");
        if colored {
            line.push_str(&style(tag).yellow().to_string());
        } else {
            line.push_str(tag);
        }
    }
    line
}

/// Uncolored single-quote line, for one-shot output.
#[must_use]
pub fn plain_quote_line(quote: &Quote) -> String {
    quote_line(quote, &format_price(quote.value()), None, false)
}

/// Bare value for scripts: no grouping, fixed decimals.
#[must_use]
pub fn value_line(value: f64) -> String {
    format!("{value:.prec$}", prec = pricetick_core::constants::PRICE_DECIMALS)
}
