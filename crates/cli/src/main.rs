//! Command Line Interface for the collectibles market-making engine.
mod report;

use anyhow::{Context, Result, bail};
use chrono::{Duration, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use ledger_mm_data::{build_daily_series, calibrate_files, label_paths, load_active, load_sold};
use ledger_mm_domain::capital::CapitalModel;
use ledger_mm_domain::entities::{Observation, ObservationSequence};
use ledger_mm_domain::value_objects::{AssetParamMap, Percentage};
use ledger_mm_simulation::backtest::{BacktestConfig, BacktestReport, Backtester};
use ledger_mm_simulation::monte_carlo::{MonteCarloRunner, PortfolioSimulationConfig};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Seed used by the `full` command so its outputs are reproducible.
const FULL_RUN_SEED: u64 = 42;
const SYNTHETIC_PERIODS: i64 = 90;

#[derive(Parser)]
#[command(name = "ledger-mm")]
#[command(about = "Backtest and Monte Carlo risk engine for collectibles market-making", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct BacktestArgs {
    /// Sold listings JSON export
    #[arg(long)]
    sold: PathBuf,

    /// Active listings JSON export (optional)
    #[arg(long)]
    active: Option<PathBuf>,

    /// Asset label shown in reports
    #[arg(long, default_value = "")]
    sku: String,

    /// Starting cash
    #[arg(long, default_value_t = 100_000.0)]
    initial_cash: f64,

    /// Quoted spread below the reference ask, in bps
    #[arg(long, default_value_t = 200)]
    spread_bps: u32,

    /// Marketplace fee on sales, in bps
    #[arg(long, default_value_t = 125)]
    fee_bps: u32,

    /// Shipping and friction cost, in bps
    #[arg(long, default_value_t = 50)]
    friction_bps: u32,

    /// Maximum units held
    #[arg(long, default_value_t = 10)]
    position_limit: u32,

    /// Relative distance from a print within which quotes fill
    #[arg(long, default_value_t = 0.02)]
    fill_proximity: f64,

    /// Multiplier applied to observed print counts
    #[arg(long, default_value_t = 1.0)]
    volume_scale: f64,
}

impl BacktestArgs {
    fn config(&self) -> BacktestConfig {
        BacktestConfig::default()
            .with_initial_cash(self.initial_cash)
            .with_spread(Percentage::from_bps(self.spread_bps).as_fraction())
            .with_fees(
                Percentage::from_bps(self.fee_bps).as_fraction(),
                Percentage::from_bps(self.friction_bps).as_fraction(),
            )
            .with_position_limit(self.position_limit)
            .with_fill_proximity(self.fill_proximity)
            .with_volume_scale(self.volume_scale)
    }

    fn label(&self) -> String {
        if self.sku.is_empty() {
            self.sold
                .file_stem()
                .map_or_else(|| "N/A".to_string(), |s| s.to_string_lossy().into_owned())
        } else {
            self.sku.clone()
        }
    }
}

#[derive(Args, Clone)]
struct MonteCarloArgs {
    /// Number of simulated paths
    #[arg(long, default_value_t = 10_000)]
    paths: usize,

    /// Trading days per path
    #[arg(long, default_value_t = 252)]
    steps: usize,

    /// Sold listings JSON export, one per asset (repeatable)
    #[arg(long)]
    sold: Vec<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Starting capital, split equally across assets
    #[arg(long, default_value_t = 100_000.0)]
    initial_cash: f64,

    /// Loading on the shared market factor
    #[arg(long, default_value_t = 0.5)]
    market_beta: f64,

    /// Daily volume below which a day counts as illiquid
    #[arg(long, default_value_t = 0.1)]
    volume_threshold: f64,

    /// Trailing illiquid days that make a holding stale
    #[arg(long, default_value_t = 180)]
    staleness_days: usize,

    /// Terminal value multiplier for stale holdings
    #[arg(long, default_value_t = 0.0)]
    haircut: f64,

    /// Ruin threshold as a fraction of initial capital
    #[arg(long, default_value_t = 0.5)]
    ruin_pct: f64,
}

impl MonteCarloArgs {
    fn config(&self, assets: AssetParamMap) -> Result<PortfolioSimulationConfig> {
        let mut config = PortfolioSimulationConfig::default()
            .with_initial_capital(self.initial_cash)
            .with_paths(self.paths)
            .with_steps(self.steps)
            .with_assets(assets)
            .with_market_beta(self.market_beta)
            .with_staleness(self.volume_threshold, self.staleness_days, self.haircut)
            .with_ruin_pct(self.ruin_pct);
        config.seed = self.seed;
        config.validate().context("Invalid Monte Carlo settings")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay sold/active exports against a synthetic order book
    Backtest {
        #[command(flatten)]
        args: BacktestArgs,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Run the portfolio Monte Carlo, calibrated from sold exports if given
    MonteCarlo {
        #[command(flatten)]
        args: MonteCarloArgs,

        /// Write the result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Backtest and seeded Monte Carlo for one asset, saved to a directory
    Full {
        /// Sold listings JSON export
        #[arg(long)]
        sold: PathBuf,

        /// Active listings JSON export (optional)
        #[arg(long)]
        active: Option<PathBuf>,

        /// Asset label
        #[arg(long, default_value = "")]
        sku: String,

        /// Output directory
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,
    },
    /// Project desk profit and working capital
    Capital {
        /// Total monthly market volume
        #[arg(long, default_value = "218000000")]
        monthly_volume: Decimal,

        /// Share of volume captured, in percent
        #[arg(long, default_value = "2")]
        capture_pct: Decimal,

        /// Sourcing alpha plus spread, in percent
        #[arg(long, default_value = "8")]
        yield_pct: Decimal,

        /// Days an item sits in inventory
        #[arg(long, default_value_t = 14)]
        turnover_days: u32,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest { args, json } => {
            let backtest = run_backtest(&args)?;
            if let Some(path) = json {
                report::write_json(&path, &backtest)?;
            }
        }
        Commands::MonteCarlo { args, json } => {
            let assets = if args.sold.is_empty() {
                AssetParamMap::new()
            } else {
                let calibration = calibrate_files(&label_paths(&args.sold));
                if calibration.is_empty() {
                    bail!(
                        "No calibratable asset in the sold exports (need priced, timestamped sales that survive cleaning)"
                    );
                }
                calibration.asset_params()
            };
            let config = args.config(assets)?;
            let result = MonteCarloRunner::new(config).run();
            report::print_monte_carlo(&result, args.ruin_pct);
            if let Some(path) = json {
                report::write_json(&path, &result)?;
            }
        }
        Commands::Full {
            sold,
            active,
            sku,
            out_dir,
        } => run_full(sold, active, sku, &out_dir)?,
        Commands::Capital {
            monthly_volume,
            capture_pct,
            yield_pct,
            turnover_days,
        } => {
            let model = CapitalModel {
                monthly_volume,
                capture: Percentage::from_percent(capture_pct),
                total_yield: Percentage::from_percent(yield_pct),
                turnover_days,
            };
            report::print_capital(&model, &model.project(), &model.sensitivity());
        }
    }

    Ok(())
}

fn run_backtest(args: &BacktestArgs) -> Result<BacktestReport> {
    let series = load_series(&args.sold, args.active.as_deref())?;
    let report = Backtester::new(args.config()).run_detailed(&series);
    report::print_backtest(&args.label(), &report.metrics);
    Ok(report)
}

fn run_full(sold: PathBuf, active: Option<PathBuf>, sku: String, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let slug = match slug(&sku) {
        s if s.is_empty() => "run".to_string(),
        s => s,
    };

    let bt_args = BacktestArgs {
        sold: sold.clone(),
        active,
        sku,
        initial_cash: 100_000.0,
        spread_bps: 200,
        fee_bps: 125,
        friction_bps: 50,
        position_limit: 10,
        fill_proximity: 0.02,
        volume_scale: 1.0,
    };
    let backtest = run_backtest(&bt_args)?;
    report::write_json(&out_dir.join(format!("backtest_{slug}.json")), &backtest)?;

    let calibration = calibrate_files(&label_paths(std::slice::from_ref(&sold)));
    if calibration.is_empty() {
        warn!(path = %sold.display(), "Sold export not calibratable; simulating the default asset");
    }
    let mc_args = MonteCarloArgs {
        paths: 10_000,
        steps: 252,
        sold: vec![sold],
        seed: Some(FULL_RUN_SEED),
        initial_cash: 100_000.0,
        market_beta: 0.5,
        volume_threshold: 0.1,
        staleness_days: 180,
        haircut: 0.0,
        ruin_pct: 0.5,
    };
    let result = MonteCarloRunner::new(mc_args.config(calibration.asset_params())?).run();
    report::print_monte_carlo(&result, mc_args.ruin_pct);
    report::write_json(&out_dir.join(format!("monte_carlo_{slug}.json")), &result)?;

    println!("\n✅ Outputs written to {}", out_dir.display());
    Ok(())
}

/// Loads the daily series, or a flat synthetic series when the export has no
/// usable sales.
fn load_series(sold: &Path, active: Option<&Path>) -> Result<ObservationSequence> {
    let sold_listings = load_sold(sold)?;
    let active_listings = match active {
        Some(path) if path.exists() => load_active(path)?,
        Some(path) => {
            warn!(path = %path.display(), "Active export not found; ignoring");
            Vec::new()
        }
        None => Vec::new(),
    };
    let series = build_daily_series(&sold_listings, &active_listings)?;
    info!(periods = series.len(), sales = sold_listings.len(), "Built daily series");

    if series.is_empty() {
        warn!(path = %sold.display(), "No usable sales; using a flat synthetic series");
        return synthetic_series();
    }
    Ok(series)
}

fn synthetic_series() -> Result<ObservationSequence> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .context("invalid synthetic start date")?;
    let observations = (0..SYNTHETIC_PERIODS)
        .map(|d| {
            Observation::new(start + Duration::days(d))
                .with_trade(100.0, 1.0)
                .with_best_ask(102.0)
                .with_listed_volume(1.0)
        })
        .collect();
    Ok(ObservationSequence::new(observations)?)
}

/// File-name-safe form of an asset label.
fn slug(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("2024 Anthony Edwards Prizm PSA 10"), "2024_Anthony_Edwards_Prizm_PSA_10");
        assert_eq!(slug("  Card #1/99 "), "Card__1_99");
        assert_eq!(slug("   "), "");
    }

    #[test]
    fn test_synthetic_series() {
        let series = synthetic_series().unwrap();
        assert_eq!(series.len(), 90);
        assert!(!series.is_all_missing());
    }

    #[test]
    fn test_cli_parses_bps_flags() {
        let cli = Cli::parse_from(["ledger-mm", "backtest", "--sold", "s.json", "--spread-bps", "300"]);
        match cli.command {
            Commands::Backtest { args, json } => {
                assert!(json.is_none());
                assert!((args.config().spread - 0.03).abs() < 1e-12);
                assert!((args.config().fee - 0.0125).abs() < 1e-12);
                assert_eq!(args.label(), "s");
            }
            _ => panic!("expected backtest"),
        }
    }

    #[test]
    fn test_monte_carlo_rejects_haircut_above_one() {
        let parse = |haircut: &str| {
            match Cli::parse_from(["ledger-mm", "monte-carlo", "--haircut", haircut, "--seed", "3"]).command {
                Commands::MonteCarlo { args, .. } => args.config(AssetParamMap::new()),
                _ => panic!("expected monte-carlo"),
            }
        };
        let config = parse("0.4").unwrap();
        assert_eq!(config.staleness_haircut, 0.4);
        assert_eq!(config.seed, Some(3));

        let err = parse("1.5").unwrap_err();
        assert!(format!("{err:#}").contains("staleness haircut"));
    }
}
