pub mod backtest_metrics;
pub mod calibrated_params;
pub mod percentage;
pub mod simulation_result;

pub use backtest_metrics::BacktestMetrics;
pub use calibrated_params::{AssetParamMap, AssetParams, CalibratedParams};
pub use percentage::Percentage;
pub use simulation_result::SimulationResult;

use serde::{Deserialize, Serialize};

/// Five-number summary of a terminal value distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}
