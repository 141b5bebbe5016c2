//! Period-by-period backtest loop.

use super::config::BacktestConfig;
use super::metrics;
use super::order_book::{SyntheticQuote, fill_size};
use super::state::InventoryState;
use crate::event::{EventLog, FillEvent, Side};
use ledger_mm_domain::entities::ObservationSequence;
use ledger_mm_domain::value_objects::BacktestMetrics;
use serde::Serialize;
use tracing::{debug, info};

/// Metrics plus the full audit trail of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Derived performance metrics.
    pub metrics: BacktestMetrics,
    /// Every simulated fill.
    pub events: EventLog,
    /// Units held at the end of each period.
    pub positions: Vec<u32>,
}

/// Value of holding one unit bought at the first observed trade price.
#[derive(Debug, Clone, Copy)]
struct HoldBenchmark {
    initial_cash: f64,
    entry_price: Option<f64>,
}

impl HoldBenchmark {
    fn new(initial_cash: f64, observations: &ObservationSequence) -> Self {
        let entry_price = observations
            .iter()
            .find_map(|o| o.trade_price())
            .filter(|&p| p > 0.0);
        Self {
            initial_cash,
            entry_price,
        }
    }

    fn value(&self, last_trade: Option<f64>) -> f64 {
        match (self.entry_price, last_trade) {
            (Some(entry), Some(mark)) => self.initial_cash - entry + mark,
            _ => self.initial_cash,
        }
    }
}

/// Replays an observation sequence against a synthetic order book.
///
/// Each run owns its state; one `Backtester` may be reused for any number of
/// independent runs.
#[derive(Debug, Clone, Default)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    /// Creates a backtester with the given configuration.
    #[must_use]
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Runs the backtest and returns its metrics.
    #[must_use]
    pub fn run(&self, observations: &ObservationSequence) -> BacktestMetrics {
        self.run_detailed(observations).metrics
    }

    /// Runs the backtest and returns metrics, fills and position history.
    ///
    /// An empty or all-missing sequence yields zeroed metrics.
    #[must_use]
    pub fn run_detailed(&self, observations: &ObservationSequence) -> BacktestReport {
        if observations.is_all_missing() {
            debug!(periods = observations.len(), "No priced periods; skipping backtest");
            return BacktestReport::default();
        }

        let cfg = &self.config;
        let net_multiplier = cfg.net_price_multiplier();
        let benchmark = HoldBenchmark::new(cfg.initial_cash, observations);

        let mut state = InventoryState::new(cfg.initial_cash);
        let mut events = EventLog::new();
        let mut equity_curve = Vec::with_capacity(observations.len());
        let mut hold_curve = Vec::with_capacity(observations.len());
        let mut positions = Vec::with_capacity(observations.len());
        let mut last_trade: Option<f64> = None;

        for (step, obs) in observations.iter().enumerate() {
            let trade_price = obs.trade_price();
            if trade_price.is_some() {
                last_trade = trade_price;
            }
            let mark = last_trade.unwrap_or(0.0);

            // Periods without a reference price are only marked to market.
            if let Some(reference) = obs.reference_price() {
                let quote = SyntheticQuote::around(reference, cfg.spread);

                if let Some(price) = trade_price {
                    let scaled_volume = obs
                        .trade_volume
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0)
                        * cfg.volume_scale;

                    if state.position < cfg.position_limit
                        && quote.would_fill(Side::Buy, price, scaled_volume, cfg.fill_proximity)
                    {
                        let size = fill_size(scaled_volume, cfg.position_limit - state.position);
                        if let Some(cost) = state.buy(size, price * net_multiplier) {
                            events.record(FillEvent::buy(step, obs.timestamp, price, size, cost));
                        }
                    }

                    if state.position > 0
                        && quote.would_fill(Side::Sell, price, scaled_volume, cfg.fill_proximity)
                    {
                        let size = fill_size(scaled_volume, state.position);
                        let (proceeds, pnl) = state.sell(size, price, net_multiplier);
                        events.record(FillEvent::sell(
                            step,
                            obs.timestamp,
                            price,
                            size,
                            proceeds,
                            pnl,
                        ));
                    }
                }

                state.accrue_inventory_risk(mark);
            }

            equity_curve.push(state.equity(mark));
            hold_curve.push(benchmark.value(last_trade));
            positions.push(state.position);
        }

        let returns = metrics::period_returns(cfg.initial_cash, &equity_curve);
        let final_equity = equity_curve.last().copied().unwrap_or(cfg.initial_cash);

        let metrics = BacktestMetrics {
            total_pnl: final_equity - cfg.initial_cash,
            sharpe_ratio: metrics::sharpe_ratio(&returns),
            max_drawdown_pct: metrics::max_drawdown_pct(cfg.initial_cash, &equity_curve),
            inventory_risk_cost: state.inventory_risk_cost,
            num_trades: state.realized_pnls.len(),
            num_fills: events.len(),
            win_rate_pct: metrics::win_rate_pct(&state.realized_pnls),
            equity_curve,
            hold_curve,
        };

        info!(
            periods = observations.len(),
            fills = metrics.num_fills,
            total_pnl = metrics.total_pnl,
            sharpe = metrics.sharpe_ratio,
            max_drawdown_pct = metrics.max_drawdown_pct,
            "Backtest complete"
        );

        BacktestReport {
            metrics,
            events,
            positions,
        }
    }
}

/// Runs a single backtest with `config` over `observations`.
#[must_use]
pub fn run_backtest(config: &BacktestConfig, observations: &ObservationSequence) -> BacktestMetrics {
    Backtester::new(config.clone()).run(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ledger_mm_domain::entities::Observation;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn flat_series(periods: i64) -> ObservationSequence {
        let obs = (0..periods)
            .map(|d| {
                Observation::new(day(d))
                    .with_trade(100.0, 1.0)
                    .with_best_ask(102.0)
            })
            .collect();
        ObservationSequence::new(obs).unwrap()
    }

    /// Ask far above the print so only bids fill.
    fn accumulating_series(periods: i64, volume: f64) -> ObservationSequence {
        let obs = (0..periods)
            .map(|d| {
                Observation::new(day(d))
                    .with_trade(100.0, volume)
                    .with_best_ask(120.0)
            })
            .collect();
        ObservationSequence::new(obs).unwrap()
    }

    #[test]
    fn test_empty_sequence_yields_zero_metrics() {
        let metrics = Backtester::default().run(&ObservationSequence::empty());
        assert_eq!(metrics, BacktestMetrics::default());
    }

    #[test]
    fn test_all_missing_yields_zero_metrics() {
        let obs = vec![Observation::new(day(0)), Observation::new(day(1))];
        let seq = ObservationSequence::new(obs).unwrap();
        let metrics = Backtester::default().run(&seq);
        assert_eq!(metrics, BacktestMetrics::default());
    }

    #[test]
    fn test_flat_market_round_trips() {
        let report = Backtester::default().run_detailed(&flat_series(90));
        let m = &report.metrics;

        assert_eq!(m.equity_curve.len(), 90);
        assert_eq!(m.hold_curve.len(), 90);
        assert_eq!(m.num_fills, 180);
        assert_eq!(m.num_trades, 90);
        assert_eq!(m.win_rate_pct, 100.0);
        assert!(m.sharpe_ratio.is_finite());
        assert!((0.0..=100.0).contains(&m.max_drawdown_pct));
        assert_eq!(m.inventory_risk_cost, 0.0);
        assert!(m.total_pnl.abs() < 1e-6);

        let sides: Vec<Side> = report.events.events().iter().take(4).map(|e| e.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Sell, Side::Buy, Side::Sell]);
    }

    #[test]
    fn test_no_fills_conserves_cash() {
        let config = BacktestConfig::default()
            .with_spread(0.5)
            .with_fill_proximity(0.0);
        let seq = accumulating_series(30, 1.0);
        let m = Backtester::new(config).run(&seq);

        assert_eq!(m.num_fills, 0);
        assert!(m.equity_curve.iter().all(|&e| e == 100_000.0));
        assert_eq!(m.total_pnl, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_position_limit_respected() {
        let config = BacktestConfig::default().with_spread(0.16);
        let report = Backtester::new(config).run_detailed(&accumulating_series(20, 3.0));

        assert!(report.positions.iter().all(|&p| p <= 10));
        assert_eq!(report.positions[..4], [3, 6, 9, 10]);
        assert_eq!(*report.positions.last().unwrap(), 10);
        assert_eq!(report.metrics.num_fills, 4);
        assert_eq!(report.metrics.num_trades, 0);
        assert!(report.metrics.inventory_risk_cost > 0.0);
    }

    #[test]
    fn test_insufficient_cash_blocks_buy() {
        let config = BacktestConfig::default()
            .with_spread(0.16)
            .with_initial_cash(50.0);
        let report = Backtester::new(config).run_detailed(&accumulating_series(5, 1.0));
        assert!(report.events.is_empty());
        assert!(report.positions.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_missing_reference_marks_at_last_trade() {
        let config = BacktestConfig::default()
            .with_spread(0.16)
            .with_position_limit(1);
        let obs = vec![
            Observation::new(day(0)).with_trade(100.0, 1.0).with_best_ask(120.0),
            Observation::new(day(1)),
        ];
        let seq = ObservationSequence::new(obs).unwrap();
        let report = Backtester::new(config).run_detailed(&seq);
        let curve = &report.metrics.equity_curve;

        assert_eq!(curve.len(), 2);
        assert_eq!(report.positions, vec![1, 1]);
        // No execution or holding cost in the unpriced period.
        assert_eq!(curve[1], curve[0]);
    }

    #[test]
    fn test_hold_benchmark_tracks_price() {
        let config = BacktestConfig::default().with_spread(0.5).with_fill_proximity(0.0);
        let obs = vec![
            Observation::new(day(0)).with_trade(100.0, 1.0),
            Observation::new(day(1)).with_trade(110.0, 1.0),
            Observation::new(day(2)).with_best_ask(130.0),
        ];
        let seq = ObservationSequence::new(obs).unwrap();
        let m = Backtester::new(config).run(&seq);
        assert_eq!(m.hold_curve, vec![100_000.0, 100_010.0, 100_010.0]);
    }

    #[test]
    fn test_sell_realizes_profit_on_rally() {
        // Buy at 100 with a tight book, then the print moves up to our ask.
        let config = BacktestConfig::default()
            .with_spread(0.0)
            .with_fees(0.0, 0.0)
            .with_fill_proximity(0.0)
            .with_position_limit(1);
        let obs = vec![
            Observation::new(day(0)).with_trade(100.0, 1.0).with_best_ask(101.0),
            Observation::new(day(1)).with_trade(110.0, 1.0).with_best_ask(110.0),
        ];
        let seq = ObservationSequence::new(obs).unwrap();
        let report = Backtester::new(config).run_detailed(&seq);

        assert_eq!(report.events.count_by_side(Side::Buy), 1);
        assert_eq!(report.events.count_by_side(Side::Sell), 1);
        assert_eq!(report.events.realized_pnls(), vec![10.0]);
        assert_eq!(report.metrics.win_rate_pct, 100.0);
    }
}
