//! Presentation formatting for prices and totals.
//!
//! Amounts are kept exact everywhere else; rounding happens here only.

use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY_SYMBOL: &str = "₺";

/// Render an amount as `₺1.234,56`: two fraction digits, `.` as thousands
/// separator and `,` as decimal separator.
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{grouped},{frac_part}")
}
