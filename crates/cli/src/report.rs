//! Terminal tables and JSON export.

use anyhow::{Context, Result};
use ledger_mm_domain::capital::{CapitalModel, CapitalProjection, SensitivityCell};
use ledger_mm_domain::value_objects::{BacktestMetrics, SimulationResult};
use prettytable::{Table, row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

fn money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn money_decimal(value: Decimal) -> String {
    format!("${}", value.round_dp(2))
}

pub fn print_backtest(label: &str, metrics: &BacktestMetrics) {
    println!("\n📈 Backtest: {label}");
    let mut table = Table::new();
    table.add_row(row!["Metric", "Value"]);
    table.add_row(row!["Periods", metrics.equity_curve.len()]);
    table.add_row(row!["Total PnL", money(metrics.total_pnl)]);
    table.add_row(row!["vs Hold", money(metrics.vs_hold())]);
    table.add_row(row!["Sharpe Ratio", format!("{:.3}", metrics.sharpe_ratio)]);
    table.add_row(row!["Max Drawdown", format!("{:.2}%", metrics.max_drawdown_pct)]);
    table.add_row(row!["Inventory Risk", money(metrics.inventory_risk_cost)]);
    table.add_row(row!["Fills", metrics.num_fills]);
    table.add_row(row!["Closed Trades", metrics.num_trades]);
    table.add_row(row!["Win Rate", format!("{:.1}%", metrics.win_rate_pct)]);
    table.printstd();
}

pub fn print_monte_carlo(result: &SimulationResult, ruin_pct: f64) {
    println!(
        "\n🎲 Monte Carlo: {} paths, {} assets ({})",
        result.final_values.len(),
        result.num_assets(),
        result.asset_labels.join(", ")
    );
    let s = &result.summary;
    let mut table = Table::new();
    table.add_row(row!["Statistic", "Value"]);
    table.add_row(row!["Mean", money(s.mean)]);
    table.add_row(row!["Std", money(s.std)]);
    table.add_row(row!["P5", money(s.p5)]);
    table.add_row(row!["P50", money(s.p50)]);
    table.add_row(row!["P95", money(s.p95)]);
    table.add_row(row![
        format!("Ruin (< {:.0}% capital)", ruin_pct * 100.0),
        format!("{:.2}%", result.probability_of_ruin * 100.0)
    ]);
    table.add_row(row![
        format!("Ruin with stale inventory ({}d)", result.staleness_days_threshold),
        format!("{:.2}%", result.probability_of_ruin_staleness * 100.0)
    ]);
    table.printstd();
}

pub fn print_capital(model: &CapitalModel, projection: &CapitalProjection, grid: &[SensitivityCell]) {
    println!(
        "\n💰 Capital model: {} monthly volume, {}% capture, {}% yield, {}d turnover",
        money_decimal(model.monthly_volume),
        model.capture.as_percent().normalize(),
        model.total_yield.as_percent().normalize(),
        model.turnover_days
    );
    let mut table = Table::new();
    table.add_row(row!["Output", "Value"]);
    table.add_row(row!["Volume captured / month", money_decimal(projection.monthly_volume_captured)]);
    table.add_row(row!["Gross profit / month", money_decimal(projection.monthly_gross_profit)]);
    table.add_row(row!["Annual run rate", money_decimal(projection.annual_run_rate)]);
    table.add_row(row!["Working capital", money_decimal(projection.required_working_capital)]);
    table.add_row(row![
        "Monthly ROI",
        format!("{}%", (projection.monthly_roi * Decimal::from(100)).round_dp(2))
    ]);
    table.printstd();

    println!("\nSensitivity: monthly gross profit by capture × yield");
    let mut grid_table = Table::new();
    grid_table.add_row(row!["Capture", "Yield", "Gross profit / month"]);
    for cell in grid {
        grid_table.add_row(row![
            format!("{}%", cell.capture.as_percent().normalize()),
            format!("{}%", cell.total_yield.as_percent().normalize()),
            money_decimal(cell.monthly_gross_profit)
        ]);
    }
    grid_table.printstd();
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("💾 Saved {}", path.display());
    Ok(())
}
