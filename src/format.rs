use crate::error::{Error, Result};

const FRACTION_DIGITS: usize = 10;
/// Runs of this many leading fractional zeros or more are collapsed.
const SUBSCRIPT_THRESHOLD: usize = 4;
const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Formats a price for display, collapsing long zero runs:
/// `0.0000001234` becomes `0.0₆1234`, `0.001234` stays as is. The digits
/// after a collapsed run are kept to the tenth decimal, zeros included.
pub fn format_price(value: f64) -> Result<String> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidPrice(value));
    }
    if value == 0.0 {
        return Ok("0".to_string());
    }

    let s = format!("{:.*}", FRACTION_DIGITS, value);
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), ""));
    let significant = frac_part.trim_start_matches('0');
    let lead_zeros = frac_part.len() - significant.len();

    if lead_zeros >= SUBSCRIPT_THRESHOLD && !significant.is_empty() {
        return Ok(format!("{}.0{}{}", int_part, subscript(lead_zeros), significant));
    }

    Ok(s.trim_end_matches('0').trim_end_matches('.').to_string())
}

fn subscript(n: usize) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUBSCRIPT_DIGITS[d as usize])
        .collect()
}

/// Dollar figure with a K/M/B suffix, two decimals.
pub fn format_compact_usd(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}
