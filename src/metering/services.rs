//! Metering service functions with database access.
//!
//! These compose the cached tariff snapshot with the pure calculators.
//! Everything below this layer is side-effect free.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::{AppCache, UTILITY_TYPES_KEY};
use crate::error::AppError;

use super::calculators::{calculate_cost, CostBreakdown, TierAllocation};
use super::models::{TariffSnapshot, UtilityType};
use super::queries;

/// Load the tariff snapshot of a (utility, household) pair, cache first.
pub async fn load_tariff_snapshot(
    pool: &PgPool,
    cache: &AppCache,
    utility_type_id: Uuid,
    household_id: Uuid,
) -> Result<Arc<TariffSnapshot>, AppError> {
    let key = AppCache::snapshot_key(utility_type_id, household_id);

    if let Some(cached) = cache.snapshots.get(&key).await {
        tracing::debug!("Cache HIT for tariff snapshot: {}", key);
        return Ok(cached);
    }
    tracing::debug!("Cache MISS for tariff snapshot: {}", key);

    let snapshot =
        Arc::new(queries::get_tariff_snapshot(pool, utility_type_id, household_id).await?);
    cache.snapshots.insert(key, snapshot.clone()).await;

    Ok(snapshot)
}

/// Calculate what a consumption costs under the stored tariff of a
/// (utility, household) pair.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `cache` - Application cache (for the tariff snapshot)
/// * `utility_type_id` - UUID of the utility type
/// * `household_id` - UUID of the household
/// * `consumption` - Metered consumption; absent is billed as zero
/// * `allocation` - How consumption maps onto the tiers
///
/// # Returns
/// `CostBreakdown` with one line per tier
pub async fn calculate_utility_cost(
    pool: &PgPool,
    cache: &AppCache,
    utility_type_id: Uuid,
    household_id: Uuid,
    consumption: Option<Decimal>,
    allocation: TierAllocation,
) -> Result<CostBreakdown, AppError> {
    let snapshot = load_tariff_snapshot(pool, cache, utility_type_id, household_id).await?;

    if snapshot.settings.is_none() {
        tracing::warn!(
            "No utility_settings row for utility {} household {}, base fee defaults to 0",
            utility_type_id,
            household_id
        );
    }

    let tiers = snapshot.tier_inputs();
    let settings = snapshot.settings_input();
    let breakdown = calculate_cost(consumption, &tiers, settings.as_ref(), allocation)?;

    if breakdown.consumption_defaulted {
        tracing::warn!(
            "No consumption given for utility {} household {}, billed as zero",
            utility_type_id,
            household_id
        );
    }

    Ok(breakdown)
}

/// List active utility types, cache first (reference data).
pub async fn list_utility_types(
    pool: &PgPool,
    cache: &AppCache,
) -> Result<Arc<Vec<UtilityType>>, AppError> {
    if let Some(cached) = cache.utility_types.get(UTILITY_TYPES_KEY).await {
        tracing::debug!("Cache HIT for utility types");
        return Ok(cached);
    }
    tracing::debug!("Cache MISS for utility types");

    let types = Arc::new(queries::get_utility_types(pool).await?);
    cache
        .utility_types
        .insert(UTILITY_TYPES_KEY.to_string(), types.clone())
        .await;

    Ok(types)
}
