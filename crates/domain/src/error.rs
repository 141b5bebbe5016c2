//! Error types for the domain model.

use thiserror::Error;

/// Errors raised while constructing domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Observation timestamps are not strictly increasing.
    #[error("Observation timestamps must be strictly increasing (violated at index {index})")]
    NonMonotonicTimestamps { index: usize },

    /// A parameter is outside its valid domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl DomainError {
    /// Create a non-monotonic timestamp error.
    pub fn non_monotonic(index: usize) -> Self {
        Self::NonMonotonicTimestamps { index }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
