//! US-dollar display formatting shared by validation messages and renderers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Group the digits of a non-negative integer string in threes with commas.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format an amount as `$1,234` / `$1,234.56`, rounding half away from zero
/// to `fraction_digits` places.
pub fn format_usd(value: Decimal, fraction_digits: u32) -> String {
    let rounded = value.round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let mut abs = rounded.abs();
    abs.rescale(fraction_digits);
    let text = abs.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    match frac_part {
        Some(f) => format!("{sign}${}.{f}", group_thousands(int_part)),
        None => format!("{sign}${}", group_thousands(int_part)),
    }
}
