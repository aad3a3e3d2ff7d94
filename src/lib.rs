//! Rust/Axum metering cost engine for the Otthon household app.
//!
//! Serves tiered utility cost calculations, display formatting and utility
//! reference data to the main application over HTTP/JSON.

pub mod cache;
pub mod config;
pub mod error;
pub mod metering;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use cache::AppCache;
use error::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/metering", metering::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe
async fn healthz() -> &'static str {
    "ok"
}

/// Unknown paths answer with the same JSON error shape as everything else
async fn not_found() -> AppError {
    AppError::NotFound
}
