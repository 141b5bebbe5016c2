//! Timestamped sale prices used for calibration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single executed sale used for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}
