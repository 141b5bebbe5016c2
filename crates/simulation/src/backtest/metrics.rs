//! Post-run performance metrics.

use crate::stats;

/// Periods per year used to annualize the Sharpe ratio.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Simple returns of each period's equity over the previous one, the first
/// measured against `initial`.
pub fn period_returns(initial: f64, equity_curve: &[f64]) -> Vec<f64> {
    let mut prev = initial;
    equity_curve
        .iter()
        .map(|&e| {
            let r = (e - prev) / (prev + 1e-12);
            prev = e;
            r
        })
        .collect()
}

/// Annualized Sharpe ratio, 0 when returns have no dispersion.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let sd = stats::std_dev(returns);
    if sd <= 0.0 || !sd.is_finite() {
        return 0.0;
    }
    let sharpe = stats::mean(returns) / sd * PERIODS_PER_YEAR.sqrt();
    if sharpe.is_finite() { sharpe } else { 0.0 }
}

/// Largest relative decline from a running peak, in percent. The peak
/// starts at `initial`.
pub fn max_drawdown_pct(initial: f64, equity_curve: &[f64]) -> f64 {
    let mut peak = initial;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        let dd = if peak > 0.0 {
            (peak - equity) / peak
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);
    }
    max_dd * 100.0
}

/// Share of closed trades with positive P&L, in percent.
pub fn win_rate_pct(realized_pnls: &[f64]) -> f64 {
    if realized_pnls.is_empty() {
        return 0.0;
    }
    let wins = realized_pnls.iter().filter(|&&p| p > 0.0).count();
    wins as f64 / realized_pnls.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_returns() {
        let r = period_returns(100.0, &[110.0, 99.0]);
        assert!((r[0] - 0.1).abs() < 1e-9);
        assert!((r[1] + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_zero_for_flat_curve() {
        let r = period_returns(100.0, &[100.0; 10]);
        assert_eq!(sharpe_ratio(&r), 0.0);
        assert_eq!(sharpe_ratio(&[]), 0.0);
    }

    #[test]
    fn test_sharpe_sign() {
        let r = [0.01, 0.02, 0.015, 0.005];
        assert!(sharpe_ratio(&r) > 0.0);
        let r = [-0.01, -0.02, -0.015, -0.005];
        assert!(sharpe_ratio(&r) < 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let dd = max_drawdown_pct(100.0, &[120.0, 90.0, 130.0, 117.0]);
        assert!((dd - 25.0).abs() < 1e-9);
        assert_eq!(max_drawdown_pct(100.0, &[100.0, 101.0]), 0.0);
    }

    #[test]
    fn test_drawdown_from_initial_peak() {
        let dd = max_drawdown_pct(100.0, &[80.0]);
        assert!((dd - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate_pct(&[]), 0.0);
        assert_eq!(win_rate_pct(&[1.0, -1.0, 0.0, 2.0]), 50.0);
    }
}
