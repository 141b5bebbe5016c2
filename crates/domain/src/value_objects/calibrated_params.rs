use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistical parameters driving one asset's simulated price and volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetParams {
    /// Annualized mean log return.
    pub mu: f64,
    /// Annualized log-return volatility.
    pub sigma: f64,
    /// Normalized trade frequency in [0, 1].
    pub liquidity_score: f64,
}

impl AssetParams {
    /// Parameters used when no calibrated asset is available.
    pub const FALLBACK: Self = Self {
        mu: 0.05,
        sigma: 0.35,
        liquidity_score: 0.5,
    };

    pub fn new(mu: f64, sigma: f64, liquidity_score: f64) -> Self {
        Self {
            mu,
            sigma,
            liquidity_score,
        }
    }
}

/// Output of a successful calibration pass for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedParams {
    pub params: AssetParams,
    /// Number of prices that survived cleaning.
    pub n_observations: usize,
}

/// Asset identifier to parameters, ordered by identifier.
pub type AssetParamMap = BTreeMap<String, AssetParams>;
