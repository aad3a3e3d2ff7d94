//! Metering cost engine for the Otthon household app.
//!
//! Tiered utility cost calculation and display formatting. This module is
//! called by the main application via HTTP/JSON for billing operations.

pub mod calculators;
pub mod format;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    calculate_cost, round_money, CalculationError, CostBreakdown, TierAllocation,
};
pub use format::{format_consumption, format_cost};
pub use models::{ConsumptionDelta, MeterReading, TariffSnapshot};
pub use routes::router;
pub use services::calculate_utility_cost;
