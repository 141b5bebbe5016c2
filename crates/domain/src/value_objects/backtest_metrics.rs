use serde::{Deserialize, Serialize};

/// Performance summary of a completed backtest.
///
/// Produced once at the end of a run. `Default` is the well-defined result
/// for an empty or all-missing observation sequence: all zeros and empty
/// curves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    /// Final equity minus initial cash.
    pub total_pnl: f64,
    /// Annualized Sharpe ratio of per-period equity returns.
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough equity decline, in percent.
    pub max_drawdown_pct: f64,
    /// Cumulative cost charged for holding stale inventory.
    pub inventory_risk_cost: f64,
    /// Number of closed (sell) trades.
    pub num_trades: usize,
    /// Number of fills, buys and sells.
    pub num_fills: usize,
    /// Share of closed trades with positive realized P&L, in percent.
    pub win_rate_pct: f64,
    /// Equity after each period.
    pub equity_curve: Vec<f64>,
    /// Value of a buy-one-unit-and-hold benchmark after each period.
    pub hold_curve: Vec<f64>,
}

impl BacktestMetrics {
    /// Final equity, if any period was processed.
    #[must_use]
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }

    /// Strategy outperformance over the hold benchmark at the last period.
    #[must_use]
    pub fn vs_hold(&self) -> f64 {
        match (self.equity_curve.last(), self.hold_curve.last()) {
            (Some(e), Some(h)) => e - h,
            _ => 0.0,
        }
    }
}
