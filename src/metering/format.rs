//! Display formatting for consumption quantities and forint amounts.
//!
//! These functions are total: any input, including missing or negative
//! values, produces a printable string. They feed notification texts and
//! dashboard labels, so the output format is fixed and covered by tests.

use num_format::{CustomFormat, Grouping, ToFormattedString};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::calculators::round_money;

/// Hungarian-style thousands grouping with a plain ASCII space, matching
/// the strings the app has always shown ("4 800 Ft").
static HUF_FORMAT: Lazy<CustomFormat> = Lazy::new(|| {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(" ")
        .build()
        .expect("static number format is valid")
});

/// Format a consumption quantity for display.
///
/// Missing, zero and negative values all render as `"0 {unit}"`. Values
/// below one unit switch to the sub-unit (`m³` becomes `liter`, everything
/// else becomes `Wh`) scaled by 1000 and rounded to a whole number. Values
/// of one and above keep the metering unit with exactly two decimals.
pub fn format_consumption(value: Option<Decimal>, unit: &str) -> String {
    let value = match value {
        Some(v) if v > Decimal::ZERO => v,
        _ => return format!("0 {}", unit),
    };

    if value < Decimal::ONE {
        let scaled = round_money(value * dec!(1000), 0);
        let sub_unit = if unit == "m³" { "liter" } else { "Wh" };
        return format!("{} {}", scaled, sub_unit);
    }

    let mut shown = round_money(value, 2);
    shown.rescale(2);
    format!("{} {}", shown, unit)
}

/// Format a forint amount for display.
///
/// Missing and zero render as `"0 Ft"`. Everything else is rounded half-up
/// to a whole forint and grouped in thousands with a space. Negative
/// amounts (credits) keep their sign.
pub fn format_cost(value: Option<Decimal>) -> String {
    let value = match value {
        Some(v) if !v.is_zero() => v,
        _ => return "0 Ft".to_string(),
    };

    let rounded = round_money(value, 0);
    match rounded.to_i128() {
        Some(whole) => format!("{} Ft", whole.to_formatted_string(&*HUF_FORMAT)),
        // Out of integer range; show the rounded decimal ungrouped rather
        // than failing a notification render.
        None => format!("{} Ft", rounded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== format_consumption tests ====================

    #[test]
    fn test_missing_or_zero_consumption_renders_zero_with_unit() {
        assert_eq!(format_consumption(None, "m³"), "0 m³");
        assert_eq!(format_consumption(Some(dec!(0)), "m³"), "0 m³");
        assert_eq!(format_consumption(Some(dec!(0.00)), "kWh"), "0 kWh");
    }

    #[test]
    fn test_negative_consumption_renders_zero() {
        assert_eq!(format_consumption(Some(dec!(-2.5)), "m³"), "0 m³");
    }

    #[test]
    fn test_sub_unit_below_one() {
        assert_eq!(format_consumption(Some(dec!(0.5)), "m³"), "500 liter");
        assert_eq!(format_consumption(Some(dec!(0.25)), "m³"), "250 liter");
        assert_eq!(format_consumption(Some(dec!(0.75)), "kWh"), "750 Wh");
    }

    #[test]
    fn test_sub_unit_rounds_half_up() {
        assert_eq!(format_consumption(Some(dec!(0.0595)), "m³"), "60 liter");
        assert_eq!(format_consumption(Some(dec!(0.0004)), "m³"), "0 liter");
    }

    #[test]
    fn test_two_decimals_at_one_and_above() {
        assert_eq!(format_consumption(Some(dec!(1)), "m³"), "1.00 m³");
        assert_eq!(format_consumption(Some(dec!(8)), "m³"), "8.00 m³");
        assert_eq!(format_consumption(Some(dec!(8.2)), "m³"), "8.20 m³");
        assert_eq!(format_consumption(Some(dec!(12.345)), "kWh"), "12.35 kWh");
    }

    // ==================== format_cost tests ====================

    #[test]
    fn test_missing_or_zero_cost_renders_zero_forint() {
        assert_eq!(format_cost(None), "0 Ft");
        assert_eq!(format_cost(Some(dec!(0))), "0 Ft");
        assert_eq!(format_cost(Some(dec!(0.00))), "0 Ft");
    }

    #[test]
    fn test_thousands_grouped_with_space() {
        assert_eq!(format_cost(Some(dec!(4800))), "4 800 Ft");
        assert_eq!(format_cost(Some(dec!(1234567))), "1 234 567 Ft");
    }

    #[test]
    fn test_small_amounts_ungrouped() {
        assert_eq!(format_cost(Some(dec!(123))), "123 Ft");
        assert_eq!(format_cost(Some(dec!(999))), "999 Ft");
    }

    #[test]
    fn test_cost_rounds_half_up_to_whole_forint() {
        assert_eq!(format_cost(Some(dec!(4799.5))), "4 800 Ft");
        assert_eq!(format_cost(Some(dec!(4799.4))), "4 799 Ft");
        assert_eq!(format_cost(Some(dec!(0.4))), "0 Ft");
    }

    #[test]
    fn test_negative_cost_keeps_its_sign() {
        assert_eq!(format_cost(Some(dec!(-4800))), "-4 800 Ft");
    }
}
