//! Request DTOs for the metering API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::calculators::TierAllocation;

/// Request to calculate a cost against the stored tariff of a pair
#[derive(Debug, Deserialize)]
pub struct CalculateCostRequest {
    pub utility_type_id: Uuid,
    pub household_id: Uuid,
    /// Absent when the period has no reading yet; billed as zero.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub consumption: Option<Decimal>,
    #[serde(default)]
    pub allocation: TierAllocation,
}

/// Request to preview a calculation over an inline tier schedule,
/// without touching the stored configuration
#[derive(Debug, Deserialize)]
pub struct CalculatePreviewRequest {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub consumption: Option<Decimal>,
    pub tiers: Vec<TierRequest>,
    #[serde(default)]
    pub settings: Option<SettingsRequest>,
    #[serde(default)]
    pub allocation: TierAllocation,
}

/// One tier in a preview request
#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub tier_number: i32,
    pub tier_name: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub limit_value: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_unit: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub conversion_factor: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub system_usage_fee: Option<Decimal>,
}

/// Billing settings in a preview request
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub current_unit_price: Option<Decimal>,
    #[serde(default = "default_auto_calculate")]
    pub auto_calculate_cost: bool,
}

fn default_auto_calculate() -> bool {
    true
}

/// Request to drop one pair's cached snapshot after a tariff edit.
/// Sent without a body, the invalidate endpoint drops everything.
#[derive(Debug, Deserialize)]
pub struct InvalidateCacheRequest {
    pub utility_type_id: Uuid,
    pub household_id: Uuid,
}

/// Request to format a consumption quantity for display
#[derive(Debug, Deserialize)]
pub struct FormatConsumptionRequest {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub value: Option<Decimal>,
    pub unit: String,
}

/// Request to format a forint amount for display
#[derive(Debug, Deserialize)]
pub struct FormatCostRequest {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub value: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_cost_request_defaults() {
        let request: CalculateCostRequest = serde_json::from_str(
            r#"{
                "utility_type_id": "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11",
                "household_id": "b1ffcd88-8d1c-4fe9-aa5e-5cc8ce271b22"
            }"#,
        )
        .unwrap();

        assert_eq!(request.consumption, None);
        assert_eq!(request.allocation, TierAllocation::FullConsumption);
    }

    #[test]
    fn test_preview_request_parses_decimal_strings() {
        let request: CalculatePreviewRequest = serde_json::from_str(
            r#"{
                "consumption": "8.2",
                "allocation": "bracketed",
                "tiers": [
                    {
                        "tier_number": 1,
                        "tier_name": "Rezsicsökkentett",
                        "limit_value": "4",
                        "price_per_unit": "36",
                        "system_usage_fee": "8.5"
                    },
                    {
                        "tier_number": 2,
                        "tier_name": "Piaci ár",
                        "price_per_unit": "70"
                    }
                ],
                "settings": {
                    "base_fee": "1200"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(request.consumption, Some(dec!(8.2)));
        assert_eq!(request.allocation, TierAllocation::Bracketed);
        assert_eq!(request.tiers.len(), 2);
        assert_eq!(request.tiers[0].limit_value, Some(dec!(4)));
        assert_eq!(request.tiers[0].system_usage_fee, Some(dec!(8.5)));
        assert_eq!(request.tiers[1].limit_value, None);
        assert_eq!(request.tiers[1].conversion_factor, None);

        let settings = request.settings.unwrap();
        assert_eq!(settings.base_fee, Some(dec!(1200)));
        assert_eq!(settings.current_unit_price, None);
        assert!(settings.auto_calculate_cost);
    }
}
