//! Database queries for the tariff tables.
//!
//! Read-only: the main application owns writes to these tables. All
//! queries use sqlx with bind parameters.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{PricingTier, TariffSnapshot, UtilitySettings, UtilityType};

/// Get the active tiers of a (utility, household) pair in billing order
pub async fn get_active_tiers(
    pool: &PgPool,
    utility_type_id: Uuid,
    household_id: Uuid,
) -> Result<Vec<PricingTier>, AppError> {
    let tiers = sqlx::query_as::<_, PricingTier>(
        r#"
        SELECT
            id, utility_type_id, household_id,
            tier_number, tier_name, limit_value, limit_unit,
            price_per_unit, conversion_factor, conversion_unit,
            system_usage_fee, is_active
        FROM utility_price_tiers
        WHERE utility_type_id = $1
          AND household_id = $2
          AND is_active = true
        ORDER BY tier_number
        "#,
    )
    .bind(utility_type_id)
    .bind(household_id)
    .fetch_all(pool)
    .await?;

    Ok(tiers)
}

/// Get the billing settings of a (utility, household) pair
pub async fn get_settings(
    pool: &PgPool,
    utility_type_id: Uuid,
    household_id: Uuid,
) -> Result<Option<UtilitySettings>, AppError> {
    let settings = sqlx::query_as::<_, UtilitySettings>(
        r#"
        SELECT
            id, utility_type_id, household_id,
            base_fee, current_unit_price, auto_calculate_cost, is_enabled
        FROM utility_settings
        WHERE utility_type_id = $1
          AND household_id = $2
        "#,
    )
    .bind(utility_type_id)
    .bind(household_id)
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

/// Get tiers and settings of a pair on one database snapshot.
///
/// Tier edits replace the whole schedule row set, so the two selects run
/// inside a REPEATABLE READ transaction. Reading them separately could mix
/// tiers from before an edit with settings from after it.
pub async fn get_tariff_snapshot(
    pool: &PgPool,
    utility_type_id: Uuid,
    household_id: Uuid,
) -> Result<TariffSnapshot, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let tiers = sqlx::query_as::<_, PricingTier>(
        r#"
        SELECT
            id, utility_type_id, household_id,
            tier_number, tier_name, limit_value, limit_unit,
            price_per_unit, conversion_factor, conversion_unit,
            system_usage_fee, is_active
        FROM utility_price_tiers
        WHERE utility_type_id = $1
          AND household_id = $2
          AND is_active = true
        ORDER BY tier_number
        "#,
    )
    .bind(utility_type_id)
    .bind(household_id)
    .fetch_all(&mut *tx)
    .await?;

    let settings = sqlx::query_as::<_, UtilitySettings>(
        r#"
        SELECT
            id, utility_type_id, household_id,
            base_fee, current_unit_price, auto_calculate_cost, is_enabled
        FROM utility_settings
        WHERE utility_type_id = $1
          AND household_id = $2
        "#,
    )
    .bind(utility_type_id)
    .bind(household_id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(TariffSnapshot { tiers, settings })
}

/// Get all active utility types (for display and cache warming)
pub async fn get_utility_types(pool: &PgPool) -> Result<Vec<UtilityType>, AppError> {
    let types = sqlx::query_as::<_, UtilityType>(
        r#"
        SELECT id, name, display_name, unit, icon, color, sort_order, is_active
        FROM utility_types
        WHERE is_active = true
        ORDER BY sort_order, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(types)
}
