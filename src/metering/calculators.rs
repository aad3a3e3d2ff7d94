//! Core tariff calculation functions.
//!
//! Pure functions for tiered utility cost math - no database access.
//! Everything here is deterministic and safe to call concurrently; the
//! service layer owns fetching and caching of the tariff snapshot.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Name attached to the synthetic line produced in manual-price mode.
const MANUAL_RATE_LABEL: &str = "Manual rate";

/// Round to specified decimal places using half-up rounding
/// (ROUND_HALF_AWAY_FROM_ZERO).
///
/// Billing totals round half-up at the final step only; intermediate line
/// costs are kept exact to avoid cumulative drift.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use otthon_metering::metering::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// assert_eq!(round_money(dec!(33.325), 2), dec!(33.33));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a metered quantity into the billing unit of a tier.
///
/// Returns the quantity unchanged when the tier declares no conversion
/// factor (identity conversion, billing unit = metering unit). Otherwise
/// `billing quantity = metered quantity * factor`, e.g. m³ of water metered
/// for heating converted into kWh of heat energy.
///
/// # Errors
/// `InvalidConversion` when the factor is zero or negative, or when the
/// metered quantity itself is negative.
pub fn convert_to_billing_units(
    metered: Decimal,
    factor: Option<Decimal>,
) -> Result<Decimal, CalculationError> {
    if metered < Decimal::ZERO {
        return Err(CalculationError::InvalidConversion {
            reason: format!("metered quantity {} is negative", metered),
        });
    }

    match factor {
        None => Ok(metered),
        Some(factor) if factor <= Decimal::ZERO => Err(CalculationError::InvalidConversion {
            reason: format!("conversion factor {} must be positive", factor),
        }),
        Some(factor) => Ok(metered * factor),
    }
}

/// Check that a tier schedule is well formed before any cost is computed.
///
/// A valid schedule is non-empty, numbered exactly 1..=n in order, carries
/// no negative unit price, and has at most one unbounded tier which must be
/// the last one.
pub fn validate_tier_schedule(tiers: &[TierInput]) -> Result<(), CalculationError> {
    if tiers.is_empty() {
        return Err(CalculationError::InvalidTierSchedule {
            reason: "no active tiers".to_string(),
        });
    }

    let unbounded = tiers.iter().filter(|t| t.limit_value.is_none()).count();
    if unbounded > 1 {
        return Err(CalculationError::InvalidTierSchedule {
            reason: format!("{} unbounded tiers, at most one is allowed", unbounded),
        });
    }

    let last = tiers.len() - 1;
    for (index, tier) in tiers.iter().enumerate() {
        let expected = index as i32 + 1;
        if tier.tier_number != expected {
            return Err(CalculationError::InvalidTierSchedule {
                reason: format!(
                    "tier numbering must run 1..={} without gaps, found tier {} at position {}",
                    tiers.len(),
                    tier.tier_number,
                    index + 1
                ),
            });
        }
        if tier.price_per_unit < Decimal::ZERO {
            return Err(CalculationError::InvalidTierSchedule {
                reason: format!("tier {} has a negative unit price", tier.tier_number),
            });
        }
        if tier.limit_value.is_none() && index != last {
            return Err(CalculationError::InvalidTierSchedule {
                reason: format!("unbounded tier {} must be the last tier", tier.tier_number),
            });
        }
    }

    Ok(())
}

/// Calculate the cost of a metered consumption against a tier schedule.
///
/// A missing consumption value is billed as zero and recorded on the
/// breakdown via `consumption_defaulted` (a reading of "no data" is common
/// and must not abort billing); an explicitly negative value is a caller
/// bug and fails with `NegativeConsumption`. Absent settings default to
/// `base_fee = 0` and automatic calculation.
///
/// When `auto_calculate_cost` is off the schedule is ignored entirely and a
/// single line is billed at the household's manual unit price. Otherwise
/// the schedule is validated and walked in tier order; each tier converts
/// the consumption into its own billing unit and bills it according to
/// `allocation`. A tier's system usage fee is a flat addend, applied only
/// when the tier billed a non-zero quantity.
///
/// The total is rounded half-up to 2 decimal places at the very end; line
/// costs are never rounded.
pub fn calculate_cost(
    consumption: Option<Decimal>,
    tiers: &[TierInput],
    settings: Option<&SettingsInput>,
    allocation: TierAllocation,
) -> Result<CostBreakdown, CalculationError> {
    let (consumption, consumption_defaulted) = match consumption {
        Some(value) if value < Decimal::ZERO => {
            return Err(CalculationError::NegativeConsumption { value });
        }
        Some(value) => (value, false),
        None => (Decimal::ZERO, true),
    };

    let base_fee = settings.and_then(|s| s.base_fee).unwrap_or(Decimal::ZERO);
    let auto_calculate = settings.map_or(true, |s| s.auto_calculate_cost);

    let lines = if auto_calculate {
        validate_tier_schedule(tiers)?;
        tiered_lines(consumption, tiers, allocation)?
    } else {
        vec![manual_line(consumption, settings)]
    };

    let consumption_cost: Decimal = lines.iter().map(|line| line.line_cost).sum();
    let total_cost = round_money(consumption_cost + base_fee, 2);

    Ok(CostBreakdown {
        lines,
        consumption,
        consumption_defaulted,
        consumption_cost,
        base_fee,
        total_cost,
    })
}

/// Walk the schedule in tier order and produce one line per tier.
fn tiered_lines(
    consumption: Decimal,
    tiers: &[TierInput],
    allocation: TierAllocation,
) -> Result<Vec<CostLine>, CalculationError> {
    let mut lines = Vec::with_capacity(tiers.len());
    // Lower bound of the current bracket, in the billing unit of the tier
    // being sliced. Only advanced in Bracketed mode.
    let mut previous_limit = Decimal::ZERO;

    for tier in tiers {
        let converted = convert_to_billing_units(consumption, tier.conversion_factor)?;

        let billed_quantity = match allocation {
            TierAllocation::FullConsumption => converted,
            TierAllocation::Bracketed => {
                let capped = match tier.limit_value {
                    Some(limit) => converted.min(limit),
                    None => converted,
                };
                let slice = (capped - previous_limit).max(Decimal::ZERO);
                if let Some(limit) = tier.limit_value {
                    previous_limit = previous_limit.max(limit);
                }
                slice
            }
        };

        // Flat per-tier surcharge, independent of quantity; a tier that
        // billed nothing charges nothing.
        let system_usage_fee_applied = if billed_quantity > Decimal::ZERO {
            tier.system_usage_fee.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        let line_cost = billed_quantity * tier.price_per_unit + system_usage_fee_applied;

        lines.push(CostLine {
            tier_number: tier.tier_number,
            tier_name: tier.tier_name.clone(),
            billed_quantity,
            price_per_unit: tier.price_per_unit,
            system_usage_fee_applied,
            line_cost,
        });
    }

    Ok(lines)
}

/// Single line billed at the household's manually entered unit price.
fn manual_line(consumption: Decimal, settings: Option<&SettingsInput>) -> CostLine {
    let price_per_unit = settings
        .and_then(|s| s.current_unit_price)
        .unwrap_or(Decimal::ZERO);

    CostLine {
        tier_number: 0,
        tier_name: MANUAL_RATE_LABEL.to_string(),
        billed_quantity: consumption,
        price_per_unit,
        system_usage_fee_applied: Decimal::ZERO,
        line_cost: consumption * price_per_unit,
    }
}

/// How consumption is allocated across the tiers of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierAllocation {
    /// Every tier bills the entire converted consumption. This is the
    /// pattern seen on real invoices, where a subsidized line and a market
    /// line both cover the full reading.
    #[default]
    FullConsumption,
    /// Classic progressive brackets: each tier bills only the slice of
    /// consumption between the previous tier's limit and its own.
    Bracketed,
}

/// One active tier of a household's schedule (used in calculate_cost)
#[derive(Debug, Clone)]
pub struct TierInput {
    pub tier_number: i32,
    pub tier_name: String,
    /// Quantity in the billing unit at which this tier ends; None for the
    /// unbounded last tier.
    pub limit_value: Option<Decimal>,
    pub price_per_unit: Decimal,
    /// Multiplies the metered quantity into this tier's billing unit.
    pub conversion_factor: Option<Decimal>,
    /// Flat surcharge added once when the tier bills a non-zero quantity.
    pub system_usage_fee: Option<Decimal>,
}

/// Billing settings of a (utility, household) pair (used in calculate_cost)
#[derive(Debug, Clone)]
pub struct SettingsInput {
    pub base_fee: Option<Decimal>,
    pub current_unit_price: Option<Decimal>,
    pub auto_calculate_cost: bool,
}

/// One line of a cost breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct CostLine {
    /// 0 for the synthetic manual-rate line, 1-based otherwise.
    pub tier_number: i32,
    pub tier_name: String,
    pub billed_quantity: Decimal,
    pub price_per_unit: Decimal,
    pub system_usage_fee_applied: Decimal,
    pub line_cost: Decimal,
}

/// Result of a cost calculation. Built fresh on every call, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    /// The consumption value actually billed, after coercion.
    pub consumption: Decimal,
    /// True when the caller supplied no consumption and zero was billed.
    pub consumption_defaulted: bool,
    /// Sum of all line costs, before the base fee, unrounded.
    pub consumption_cost: Decimal,
    pub base_fee: Decimal,
    /// `consumption_cost + base_fee`, rounded half-up to 2 decimal places.
    pub total_cost: Decimal,
}

/// Calculation error types
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationError {
    /// Malformed tier configuration; surfaced to the administrator, no
    /// partial result is produced.
    InvalidTierSchedule { reason: String },
    /// Bad conversion input (non-positive factor or negative quantity).
    InvalidConversion { reason: String },
    /// Explicitly negative consumption from the caller.
    NegativeConsumption { value: Decimal },
}

impl std::fmt::Display for CalculationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationError::InvalidTierSchedule { reason } => {
                write!(f, "Invalid tier schedule: {}", reason)
            }
            CalculationError::InvalidConversion { reason } => {
                write!(f, "Invalid unit conversion: {}", reason)
            }
            CalculationError::NegativeConsumption { value } => {
                write!(f, "Consumption must not be negative, got {}", value)
            }
        }
    }
}

impl std::error::Error for CalculationError {}
