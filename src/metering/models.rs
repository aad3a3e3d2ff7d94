//! Row types for the tariff tables plus the reading-derived types.
//!
//! The tables are owned by the main application; this service reads them
//! and never writes. Calculator inputs are projected out of the rows via
//! the `to_input` methods so the pure core stays free of DB bookkeeping.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::calculators::{SettingsInput, TierInput};

/// Utility type reference row (water, gas, electricity, heating)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UtilityType {
    pub id: Uuid,
    /// Machine name, e.g. `water_cold`.
    pub name: String,
    pub display_name: String,
    /// Canonical metering unit shown next to readings, e.g. "m³" or "kWh".
    pub unit: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// One tier of a household's progressive price schedule
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: Uuid,
    pub utility_type_id: Uuid,
    pub household_id: Uuid,
    pub tier_number: i32,
    pub tier_name: String,
    pub limit_value: Option<Decimal>,
    pub limit_unit: Option<String>,
    pub price_per_unit: Decimal,
    pub conversion_factor: Option<Decimal>,
    pub conversion_unit: Option<String>,
    pub system_usage_fee: Option<Decimal>,
    pub is_active: bool,
}

impl PricingTier {
    /// Project the row onto the calculator's tier input.
    pub fn to_input(&self) -> TierInput {
        TierInput {
            tier_number: self.tier_number,
            tier_name: self.tier_name.clone(),
            limit_value: self.limit_value,
            price_per_unit: self.price_per_unit,
            conversion_factor: self.conversion_factor,
            system_usage_fee: self.system_usage_fee,
        }
    }
}

/// Billing settings of a (utility, household) pair
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UtilitySettings {
    pub id: Uuid,
    pub utility_type_id: Uuid,
    pub household_id: Uuid,
    pub base_fee: Option<Decimal>,
    pub current_unit_price: Option<Decimal>,
    pub auto_calculate_cost: bool,
    /// Whether the household tracks this utility at all. A display concern;
    /// the calculator bills whatever it is handed.
    pub is_enabled: bool,
}

impl UtilitySettings {
    pub fn to_input(&self) -> SettingsInput {
        SettingsInput {
            base_fee: self.base_fee,
            current_unit_price: self.current_unit_price,
            auto_calculate_cost: self.auto_calculate_cost,
        }
    }
}

/// Tiers and settings of a (utility, household) pair, read in a single
/// transaction so a calculation never mixes two edits of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffSnapshot {
    /// Active tiers ordered by `tier_number`.
    pub tiers: Vec<PricingTier>,
    pub settings: Option<UtilitySettings>,
}

impl TariffSnapshot {
    pub fn tier_inputs(&self) -> Vec<TierInput> {
        self.tiers.iter().map(PricingTier::to_input).collect()
    }

    pub fn settings_input(&self) -> Option<SettingsInput> {
        self.settings.as_ref().map(UtilitySettings::to_input)
    }
}

/// A cumulative meter reading on a given date. Storage of readings lives
/// in the main application; only the derivation rule lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterReading {
    pub reading_date: NaiveDate,
    pub meter_reading: Decimal,
}

/// Consumption derived from two consecutive readings of the same meter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumptionDelta {
    /// The gauge moved forward (or stood still).
    Usage(Decimal),
    /// The gauge moved backwards: meter replacement or counter rollover.
    /// Never interpreted as negative consumption.
    Rollover { previous: Decimal, current: Decimal },
}

impl MeterReading {
    /// Consumption since `previous`. A gauge decrease is flagged as a
    /// rollover instead of producing a negative quantity.
    pub fn consumption_since(&self, previous: &MeterReading) -> ConsumptionDelta {
        if self.meter_reading < previous.meter_reading {
            ConsumptionDelta::Rollover {
                previous: previous.meter_reading,
                current: self.meter_reading,
            }
        } else {
            ConsumptionDelta::Usage(self.meter_reading - previous.meter_reading)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reading(date: &str, value: Decimal) -> MeterReading {
        MeterReading {
            reading_date: date.parse().unwrap(),
            meter_reading: value,
        }
    }

    #[test]
    fn test_consumption_is_the_gauge_difference() {
        let previous = reading("2025-01-01", dec!(120.5));
        let current = reading("2025-02-01", dec!(128.7));
        assert_eq!(
            current.consumption_since(&previous),
            ConsumptionDelta::Usage(dec!(8.2))
        );
    }

    #[test]
    fn test_unchanged_gauge_is_zero_usage() {
        let previous = reading("2025-01-01", dec!(120.5));
        let current = reading("2025-02-01", dec!(120.5));
        assert_eq!(
            current.consumption_since(&previous),
            ConsumptionDelta::Usage(dec!(0))
        );
    }

    #[test]
    fn test_gauge_decrease_is_flagged_not_negated() {
        let previous = reading("2025-01-01", dec!(9998));
        let current = reading("2025-02-01", dec!(3));
        assert_eq!(
            current.consumption_since(&previous),
            ConsumptionDelta::Rollover {
                previous: dec!(9998),
                current: dec!(3),
            }
        );
    }
}
