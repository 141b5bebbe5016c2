use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A multiplicative rate stored as a fraction (0.02 = 2%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(10000))
    }

    /// Builds a rate from a percent figure (5 = 5%).
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent / Decimal::from(100))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(10000)).to_u32().unwrap_or(0)
    }

    /// The fraction as `f64`, as consumed by the engines.
    pub fn as_fraction(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// The rate as a percent figure, for display.
    pub fn as_percent(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }
}
