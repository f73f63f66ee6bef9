// src/error.rs

use thiserror::Error;

/// Result alias used across the planner.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Everything that can stop an experiment before or outside the simulation.
///
/// An infeasible grid search is not an error; it is reported through
/// `SearchOutcome::Infeasible`.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Rejected configuration value (costs, ranges, run counts, seeds).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Forecast input that cannot drive the demand model.
    #[error("invalid forecast input: {0}")]
    InvalidForecast(String),

    /// Policy parameters outside R >= 0, Q > 0.
    #[error("invalid policy (R={reorder_point}, Q={order_quantity}): {reason}")]
    InvalidPolicy {
        reorder_point: i64,
        order_quantity: i64,
        reason: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn forecast(message: impl Into<String>) -> Self {
        Self::InvalidForecast(message.into())
    }
}
