//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::metering::calculators::CalculationError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned with every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    error_type: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                // Detail goes to the log, not to the client.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
            AppError::Calculation(e) => {
                let (status, error_type) = match e {
                    // Misconfigured schedule: the request was fine, the
                    // stored tariff is not.
                    CalculationError::InvalidTierSchedule { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "invalid_tier_schedule")
                    }
                    CalculationError::InvalidConversion { .. } => {
                        (StatusCode::BAD_REQUEST, "invalid_conversion")
                    }
                    CalculationError::NegativeConsumption { .. } => {
                        (StatusCode::BAD_REQUEST, "negative_consumption")
                    }
                };
                (status, error_type, e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error_type, message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculation_errors_map_to_client_statuses() {
        let response = AppError::from(CalculationError::InvalidTierSchedule {
            reason: "no active tiers".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::from(CalculationError::NegativeConsumption {
            value: dec!(-1),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(CalculationError::InvalidConversion {
            reason: "conversion factor 0 must be positive".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
