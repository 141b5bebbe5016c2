//! Log-normal daily volume around an asset's liquidity score.

/// Log-volatility of simulated daily volume.
pub const VOLUME_DISPERSION: f64 = 0.3;

/// Daily trading activity simulated around an asset's liquidity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedVolume {
    /// Median daily volume.
    pub liquidity_score: f64,
    /// Log-normal dispersion.
    pub dispersion: f64,
}

impl SimulatedVolume {
    /// Creates a volume model with the default dispersion.
    #[must_use]
    pub fn new(liquidity_score: f64) -> Self {
        Self {
            liquidity_score,
            dispersion: VOLUME_DISPERSION,
        }
    }

    /// Volume for one day given a standard-normal shock.
    #[must_use]
    pub fn sample(&self, z: f64) -> f64 {
        self.liquidity_score * (self.dispersion * z).exp()
    }

    /// Whether the day's volume falls below `threshold`.
    #[must_use]
    pub fn is_below(&self, z: f64, threshold: f64) -> bool {
        self.sample(z) < threshold
    }
}
