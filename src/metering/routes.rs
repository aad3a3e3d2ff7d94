//! HTTP handlers for the metering API.
//!
//! The main application calls these over HTTP/JSON; handlers stay thin and
//! delegate to the services layer or straight to the pure calculators.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::cache::CacheStats;
use crate::error::Result;
use crate::AppState;

use super::calculators::{self, SettingsInput, TierInput};
use super::format;
use super::models::UtilityType;
use super::requests::{
    CalculateCostRequest, CalculatePreviewRequest, FormatConsumptionRequest, FormatCostRequest,
    InvalidateCacheRequest,
};
use super::responses::{CostBreakdownResponse, FormattedResponse};
use super::services;

/// Build the metering API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calculate-cost", post(calculate_cost))
        .route("/calculate", post(calculate_preview))
        .route("/format/consumption", post(format_consumption))
        .route("/format/cost", post(format_cost))
        .route("/utility-types", get(utility_types))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(cache_invalidate))
}

/// Calculate a cost from the stored tariff of a (utility, household) pair
async fn calculate_cost(
    State(state): State<AppState>,
    Json(request): Json<CalculateCostRequest>,
) -> Result<Json<CostBreakdownResponse>> {
    let breakdown = services::calculate_utility_cost(
        &state.db,
        &state.cache,
        request.utility_type_id,
        request.household_id,
        request.consumption,
        request.allocation,
    )
    .await?;

    Ok(Json(breakdown.into()))
}

/// Preview a calculation over a schedule supplied in the request body,
/// without touching the stored configuration
async fn calculate_preview(
    Json(request): Json<CalculatePreviewRequest>,
) -> Result<Json<CostBreakdownResponse>> {
    let tiers: Vec<TierInput> = request
        .tiers
        .iter()
        .map(|t| TierInput {
            tier_number: t.tier_number,
            tier_name: t.tier_name.clone(),
            limit_value: t.limit_value,
            price_per_unit: t.price_per_unit,
            conversion_factor: t.conversion_factor,
            system_usage_fee: t.system_usage_fee,
        })
        .collect();

    let settings = request.settings.as_ref().map(|s| SettingsInput {
        base_fee: s.base_fee,
        current_unit_price: s.current_unit_price,
        auto_calculate_cost: s.auto_calculate_cost,
    });

    let breakdown = calculators::calculate_cost(
        request.consumption,
        &tiers,
        settings.as_ref(),
        request.allocation,
    )?;

    Ok(Json(breakdown.into()))
}

/// Format a consumption quantity for display
async fn format_consumption(
    Json(request): Json<FormatConsumptionRequest>,
) -> Json<FormattedResponse> {
    Json(FormattedResponse {
        formatted: format::format_consumption(request.value, &request.unit),
    })
}

/// Format a forint amount for display
async fn format_cost(Json(request): Json<FormatCostRequest>) -> Json<FormattedResponse> {
    Json(FormattedResponse {
        formatted: format::format_cost(request.value),
    })
}

/// List active utility types
async fn utility_types(State(state): State<AppState>) -> Result<Json<Vec<UtilityType>>> {
    let types = services::list_utility_types(&state.db, &state.cache).await?;
    Ok(Json((*types).clone()))
}

/// Cache statistics for monitoring
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Drop cached tariff data after a configuration edit. With a body, only
/// the named pair's snapshot is dropped; without one, everything is.
async fn cache_invalidate(
    State(state): State<AppState>,
    request: Option<Json<InvalidateCacheRequest>>,
) -> Json<CacheStats> {
    match request {
        Some(Json(request)) => {
            state
                .cache
                .invalidate_snapshot(request.utility_type_id, request.household_id)
                .await;
        }
        None => state.cache.invalidate_all(),
    }

    Json(state.cache.stats())
}
