//! Error types for domain computations.

use thiserror::Error;

/// Errors from week-key parsing and schedule rendering.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A week key did not parse as a calendar date.
    #[error("invalid week key: {0}")]
    InvalidWeekKey(String),
}

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, ModelError>;
