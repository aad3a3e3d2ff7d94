//! Response DTOs for the metering API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{CostBreakdown, CostLine};
use super::format::format_cost;

/// The only currency the household app bills in.
pub const CURRENCY: &str = "Ft";

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn forint(amount: Decimal) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

/// One line of a cost breakdown response
#[derive(Debug, Clone, Serialize)]
pub struct CostLineResponse {
    pub tier_number: i32,
    pub tier_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub billed_quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_unit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub system_usage_fee_applied: Decimal,
    pub line_cost: MoneyResponse,
}

impl From<CostLine> for CostLineResponse {
    fn from(line: CostLine) -> Self {
        Self {
            tier_number: line.tier_number,
            tier_name: line.tier_name,
            billed_quantity: line.billed_quantity,
            price_per_unit: line.price_per_unit,
            system_usage_fee_applied: line.system_usage_fee_applied,
            line_cost: MoneyResponse::forint(line.line_cost),
        }
    }
}

/// Response for a cost calculation
#[derive(Debug, Serialize)]
pub struct CostBreakdownResponse {
    pub lines: Vec<CostLineResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub consumption: Decimal,
    pub consumption_defaulted: bool,
    pub consumption_cost: MoneyResponse,
    pub base_fee: MoneyResponse,
    pub total_cost: MoneyResponse,
    /// The total preformatted for notification texts, e.g. "4 800 Ft".
    pub total_display: String,
}

impl From<CostBreakdown> for CostBreakdownResponse {
    fn from(breakdown: CostBreakdown) -> Self {
        let total_display = format_cost(Some(breakdown.total_cost));
        Self {
            lines: breakdown.lines.into_iter().map(Into::into).collect(),
            consumption: breakdown.consumption,
            consumption_defaulted: breakdown.consumption_defaulted,
            consumption_cost: MoneyResponse::forint(breakdown.consumption_cost),
            base_fee: MoneyResponse::forint(breakdown.base_fee),
            total_cost: MoneyResponse::forint(breakdown.total_cost),
            total_display,
        }
    }
}

/// Response for the display formatting endpoints
#[derive(Debug, Serialize)]
pub struct FormattedResponse {
    pub formatted: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_serializes_its_amount_as_a_string() {
        let value = serde_json::to_value(MoneyResponse::forint(dec!(229.50))).unwrap();
        assert_eq!(value["amount"], "229.50");
        assert_eq!(value["currency"], "Ft");
    }

    #[test]
    fn test_breakdown_response_carries_the_display_total() {
        let breakdown = CostBreakdown {
            lines: vec![],
            consumption: dec!(0),
            consumption_defaulted: false,
            consumption_cost: dec!(0),
            base_fee: dec!(4800),
            total_cost: dec!(4800),
        };
        let response = CostBreakdownResponse::from(breakdown);

        assert_eq!(response.total_display, "4 800 Ft");
        assert_eq!(response.total_cost.currency, "Ft");
    }
}
