//! Error types for analytics operations.
//!
//! Only invalid domain arguments are errors. Sparse or empty data produces
//! a defined degenerate value instead, and scores that reference unknown
//! criteria are skipped.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range for criterion '{criterion_id}': max {max_value} must exceed min {min_value}")]
    InvalidCriterionRange {
        criterion_id: String,
        min_value: f64,
        max_value: f64,
    },

    #[error("Criterion '{criterion_id}' has negative weight {weight}")]
    NegativeWeight { criterion_id: String, weight: f64 },
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
