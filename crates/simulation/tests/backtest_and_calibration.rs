use chrono::{DateTime, Duration, TimeZone, Utc};
use ledger_mm_domain::entities::{Observation, ObservationSequence, PricePoint};
use ledger_mm_simulation::calibration::clean_prices;
use ledger_mm_simulation::prelude::*;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn noisy_series(periods: i64) -> ObservationSequence {
    let obs = (0..periods)
        .map(|d| {
            let wave = ((d % 7) as f64 - 3.0) * 1.5;
            let mut o = Observation::new(day(d)).with_best_ask(104.0 + wave);
            if d % 3 != 2 {
                o = o.with_trade(100.0 + wave, (d % 4) as f64);
            }
            o
        })
        .collect();
    ObservationSequence::new(obs).unwrap()
}

#[test]
fn test_backtest_is_deterministic() {
    let seq = noisy_series(120);
    let config = BacktestConfig::default().with_spread(0.03);
    assert_eq!(run_backtest(&config, &seq), run_backtest(&config, &seq));
}

#[test]
fn test_positions_stay_within_limit() {
    let seq = noisy_series(200);
    for limit in [1, 3, 10] {
        let config = BacktestConfig::default()
            .with_position_limit(limit)
            .with_volume_scale(4.0);
        let report = Backtester::new(config).run_detailed(&seq);
        assert_eq!(report.positions.len(), 200);
        assert!(report.positions.iter().all(|&p| p <= limit));
    }
}

#[test]
fn test_without_fills_equity_stays_at_initial_cash() {
    let seq = noisy_series(60);
    let config = BacktestConfig::default()
        .with_initial_cash(25_000.0)
        .with_spread(0.9)
        .with_fill_proximity(0.0);
    let report = Backtester::new(config).run_detailed(&seq);

    assert!(report.events.is_empty());
    assert!(report.metrics.equity_curve.iter().all(|&e| e == 25_000.0));
    assert_eq!(report.metrics.total_pnl, 0.0);
    assert_eq!(report.metrics.max_drawdown_pct, 0.0);
}

#[test]
fn test_flat_market_has_no_inventory_cost() {
    let obs = (0..90)
        .map(|d| Observation::new(day(d)).with_trade(100.0, 1.0).with_best_ask(102.0))
        .collect();
    let seq = ObservationSequence::new(obs).unwrap();
    let m = run_backtest(&BacktestConfig::default(), &seq);

    assert_eq!(m.equity_curve.len(), 90);
    assert!(m.sharpe_ratio.is_finite());
    assert!((0.0..=100.0).contains(&m.max_drawdown_pct));
    assert_eq!(m.inventory_risk_cost, 0.0);
}

#[test]
fn test_report_metrics_are_consistent() {
    let report = Backtester::default().run_detailed(&noisy_series(150));
    let m = &report.metrics;

    assert_eq!(m.num_fills, report.events.len());
    assert_eq!(m.num_trades, report.events.count_by_side(Side::Sell));
    assert!((0.0..=100.0).contains(&m.win_rate_pct));
    assert!((m.total_pnl - (m.final_equity().unwrap() - 100_000.0)).abs() < 1e-9);
}

#[test]
fn test_cleaning_is_idempotent_when_minimum_is_repeated() {
    // Holds only while the 1st-percentile fence equals the surviving minimum.
    let config = CleaningConfig::default();
    let raw = [
        3.0, 40.0, 40.0, 41.0, 44.0, 39.0, 43.0, 42.0, 45.0, 400.0, 38.0, 38.0, f64::NAN,
    ];
    let once = clean_prices(&raw, &config);
    let twice = clean_prices(&once, &config);
    assert_eq!(once, twice);
    assert!(!once.contains(&400.0));
    assert!(!once.contains(&3.0));
}

#[test]
fn test_cleaning_twice_tightens_a_unique_minimum() {
    let config = CleaningConfig::default();
    let raw = [3.0, 40.0, 41.0, 44.0, 39.0, 43.0, 42.0, 45.0, 400.0];
    let once = clean_prices(&raw, &config);
    let twice = clean_prices(&once, &config);
    assert_eq!(once, vec![40.0, 41.0, 44.0, 43.0, 42.0, 45.0]);
    assert_eq!(twice, vec![41.0, 44.0, 43.0, 42.0, 45.0]);
}

#[test]
fn test_single_observation_fails_calibration() {
    let history = vec![PricePoint::new(day(0), 120.0)];
    assert_eq!(
        calibrate(&history),
        Err(CalibrationError::insufficient_data(2, 1))
    );
}

#[test]
fn test_calibration_feeds_monte_carlo() {
    let mut histories = std::collections::BTreeMap::new();
    histories.insert(
        "sku-a".to_string(),
        (0..40)
            .map(|d| PricePoint::new(day(d), 100.0 + (d % 5) as f64))
            .collect::<Vec<_>>(),
    );
    histories.insert("sku-b".to_string(), vec![PricePoint::new(day(0), 50.0)]);

    let report = calibrate_portfolio(&histories);
    assert_eq!(report.calibrated.len(), 1);
    assert!(report.failures.contains_key("sku-b"));

    let config = PortfolioSimulationConfig::default()
        .with_paths(100)
        .with_steps(20)
        .with_seed(1)
        .with_assets(report.asset_params());
    let result = run_portfolio_monte_carlo(&config);
    assert_eq!(result.asset_labels, vec!["sku-a".to_string()]);
}
