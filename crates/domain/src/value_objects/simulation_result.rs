use super::DistributionSummary;
use serde::{Deserialize, Serialize};

/// Outcome distribution of a portfolio Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Terminal portfolio value for each path.
    pub final_values: Vec<f64>,
    /// Summary statistics over `final_values`.
    pub summary: DistributionSummary,
    /// Fraction of paths ending below the ruin threshold.
    pub probability_of_ruin: f64,
    /// Fraction of paths that are ruined and hold at least one stale asset.
    pub probability_of_ruin_staleness: f64,
    /// Trailing low-volume run length that marks a holding as stale.
    pub staleness_days_threshold: usize,
    /// Assets included, in simulation order.
    pub asset_labels: Vec<String>,
}

impl SimulationResult {
    /// Number of assets in the portfolio.
    pub fn num_assets(&self) -> usize {
        self.asset_labels.len()
    }

    /// Share of ruin attributable to stale inventory.
    pub fn staleness_share_of_ruin(&self) -> f64 {
        if self.probability_of_ruin > 0.0 {
            self.probability_of_ruin_staleness / self.probability_of_ruin
        } else {
            0.0
        }
    }
}
