//! Discretized geometric Brownian motion for daily price simulation.

/// Step size of one trading day, in years.
pub const DAILY_TIME_STEP: f64 = 1.0 / 252.0;

/// Geometric Brownian motion discretized into log-return increments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricBrownianMotion {
    /// Annualized drift.
    pub drift: f64,
    /// Annualized volatility.
    pub volatility: f64,
    /// Step length in years.
    pub time_step: f64,
}

impl GeometricBrownianMotion {
    pub fn new(drift: f64, volatility: f64, time_step: f64) -> Self {
        Self {
            drift,
            volatility,
            time_step,
        }
    }

    /// GBM stepped once per trading day.
    pub fn daily(drift: f64, volatility: f64) -> Self {
        Self::new(drift, volatility, DAILY_TIME_STEP)
    }

    /// Deterministic part of each log-return: `(mu - sigma^2 / 2) * dt`.
    pub fn drift_term(&self) -> f64 {
        (self.drift - 0.5 * self.volatility.powi(2)) * self.time_step
    }

    /// Scale of the random part of each log-return: `sigma * sqrt(dt)`.
    pub fn diffusion_term(&self) -> f64 {
        self.volatility * self.time_step.sqrt()
    }

    /// Log-return for one step given a standard-normal shock.
    pub fn log_increment(&self, z: f64) -> f64 {
        self.drift_term() + self.diffusion_term() * z
    }
}
