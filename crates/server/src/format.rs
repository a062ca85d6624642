//! Display formatting for CLI output (Brazilian real)

use rust_decimal::{Decimal, RoundingStrategy};

/// `1234.5` → `"R$ 1.234,50"`
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// `15` → `"15.00%"`
pub fn format_percent(value: Decimal) -> String {
    format!(
        "{:.2}%",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(dec!(0)), "R$ 0,00");
        assert_eq!(format_currency(dec!(5.5)), "R$ 5,50");
        assert_eq!(format_currency(dec!(206.896551)), "R$ 206,90");
        assert_eq!(format_currency(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_currency(dec!(1234567.891)), "R$ 1.234.567,89");
    }

    #[test]
    fn test_currency_negative_and_rounding() {
        assert_eq!(format_currency(dec!(-12.345)), "-R$ 12,35");
        assert_eq!(format_currency(dec!(-0.001)), "R$ 0,00");
        assert_eq!(format_currency(dec!(999.995)), "R$ 1.000,00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(dec!(15)), "15.00%");
        assert_eq!(format_percent(dec!(14.999)), "15.00%");
        assert_eq!(format_percent(dec!(12.5)), "12.50%");
    }
}
