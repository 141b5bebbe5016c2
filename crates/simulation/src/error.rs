//! Error types for the simulation engines.

use thiserror::Error;

/// Calibration failure for a single asset.
///
/// Never fatal to a batch: callers exclude the asset and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// Too few observations or cleaned prices to estimate parameters.
    #[error("Insufficient data: need at least {required} prices, got {available}")]
    InsufficientData { required: usize, available: usize },
}

impl CalibrationError {
    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }
}
