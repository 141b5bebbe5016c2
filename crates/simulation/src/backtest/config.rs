//! Backtest configuration.

use serde::{Deserialize, Serialize};

/// Immutable parameters of a backtest run.
///
/// All rates are fractions, not percentages. Spread and fees may exceed 1;
/// such configurations are degenerate but accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Starting cash balance.
    pub initial_cash: f64,
    /// Bid distance below the reference price, as a fraction of it.
    pub spread: f64,
    /// Maximum inventory in units.
    pub position_limit: u32,
    /// Marketplace fee per fill.
    pub fee: f64,
    /// Shipping and grading friction per fill.
    pub friction: f64,
    /// How close a quote must be to the executed price to count as filled.
    pub fill_proximity: f64,
    /// Multiplier applied to historical print counts.
    pub volume_scale: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            spread: 0.02,
            position_limit: 10,
            fee: 0.0125,
            friction: 0.005,
            fill_proximity: 0.02,
            volume_scale: 1.0,
        }
    }
}

impl BacktestConfig {
    /// Sets the initial cash.
    #[must_use]
    pub fn with_initial_cash(mut self, initial_cash: f64) -> Self {
        self.initial_cash = initial_cash;
        self
    }

    /// Sets the spread fraction.
    #[must_use]
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Sets the position limit.
    #[must_use]
    pub fn with_position_limit(mut self, position_limit: u32) -> Self {
        self.position_limit = position_limit;
        self
    }

    /// Sets the fee and friction fractions.
    #[must_use]
    pub fn with_fees(mut self, fee: f64, friction: f64) -> Self {
        self.fee = fee;
        self.friction = friction;
        self
    }

    /// Sets the fill proximity fraction.
    #[must_use]
    pub fn with_fill_proximity(mut self, fill_proximity: f64) -> Self {
        self.fill_proximity = fill_proximity;
        self
    }

    /// Sets the volume scale.
    #[must_use]
    pub fn with_volume_scale(mut self, volume_scale: f64) -> Self {
        self.volume_scale = volume_scale;
        self
    }

    /// Share of the executed price kept after fee and friction.
    #[must_use]
    pub fn net_price_multiplier(&self) -> f64 {
        1.0 - self.fee - self.friction
    }
}
