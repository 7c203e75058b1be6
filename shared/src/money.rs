//! Money calculation utilities using rust_decimal for precision
//!
//! Prices arrive from the backend as JSON numbers and are held as
//! `Decimal` from then on, so totals never pick up float error.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to 2 decimal places
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Order line total: unit price × quantity, rounded to cents
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Format an amount for display, e.g. `$30.00`
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

/// Clamp an entered quantity to `[1, available]`.
///
/// Non-positive input becomes 1. When nothing is available the floor
/// still wins, so the result is 1 and ordering is blocked elsewhere.
pub fn clamp_quantity(entered: i64, available: u32) -> u32 {
    let upper = i64::from(available.max(1));
    entered.clamp(1, upper) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_total_exact() {
        assert_eq!(line_total(dec("10.00"), 3), dec("30.00"));
        assert_eq!(line_total(dec("0.10"), 3), dec("0.30"));
        assert_eq!(line_total(dec("19.99"), 7), dec("139.93"));
    }

    #[test]
    fn test_line_total_rounds_half_away_from_zero() {
        assert_eq!(line_total(dec("0.125"), 1), dec("0.13"));
        assert_eq!(line_total(dec("0.333"), 3), dec("1.00"));
    }

    #[test]
    fn test_line_total_from_float_price() {
        // 0.1 as a JSON float, deserialized the way product prices are
        let price: Decimal = Decimal::from_f64(0.1).unwrap();
        assert_eq!(line_total(price, 3), dec("0.30"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("30")), "$30.00");
        assert_eq!(format_money(dec("12.5")), "$12.50");
        assert_eq!(format_money(dec("0.005")), "$0.01");
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(10, 4), 4);
        assert_eq!(clamp_quantity(4, 4), 4);
        assert_eq!(clamp_quantity(2, 4), 2);
        assert_eq!(clamp_quantity(0, 4), 1);
        assert_eq!(clamp_quantity(-3, 4), 1);
        assert_eq!(clamp_quantity(5, 0), 1);
    }
}
