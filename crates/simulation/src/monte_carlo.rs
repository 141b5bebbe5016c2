//! Portfolio Monte Carlo with correlated GBM prices and liquidity staleness.
//!
//! Every asset shares a per-step market shock blended with its own
//! idiosyncratic shock, so assets are pairwise correlated by `beta^2`.
//! Simulated daily volume decides whether a holding is stale at the horizon;
//! stale holdings are written down before ruin is assessed.
//!
//! All randomness comes from one generator drawn in a fixed order: every
//! market shock (path, step), then every idiosyncratic shock
//! (path, step, asset), then every volume shock (path, step, asset). Assets
//! are ordered by identifier, so a seeded run is reproducible regardless of
//! how the parameter map was built.

use crate::price_path::GeometricBrownianMotion;
use crate::staleness::{TrailingRun, value_multiplier};
use crate::stats;
use crate::volume::SimulatedVolume;
use ledger_mm_domain::DomainError;
use ledger_mm_domain::value_objects::{AssetParamMap, AssetParams, SimulationResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Initial price for assets without an explicit one.
pub const DEFAULT_INITIAL_PRICE: f64 = 100.0;
/// Lower bound applied to every asset's volatility.
pub const MIN_SIGMA: f64 = 1e-6;
/// Label of the synthetic asset used when no parameters are supplied.
pub const FALLBACK_ASSET: &str = "Default";

/// Configuration of a portfolio Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSimulationConfig {
    /// Capital split equally across assets at the start.
    pub initial_capital: f64,
    /// Trading days simulated.
    pub num_steps: usize,
    /// Independent scenarios.
    pub num_paths: usize,
    /// Per-asset drift, volatility and liquidity.
    pub asset_params: AssetParamMap,
    /// Per-asset starting price; missing assets start at
    /// [`DEFAULT_INITIAL_PRICE`].
    pub initial_prices: BTreeMap<String, f64>,
    /// Loading on the shared market factor, clipped to `[0, 1]`.
    pub market_beta: f64,
    /// Daily volume below which a day counts as illiquid.
    pub volume_threshold: f64,
    /// Trailing illiquid days that make a holding stale.
    pub staleness_days: usize,
    /// Multiplier on a stale holding's terminal value (0 = write-off).
    pub staleness_haircut: f64,
    /// Ruin means ending below this fraction of initial capital.
    pub ruin_pct: f64,
    /// Generator seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PortfolioSimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            num_steps: 252,
            num_paths: 10_000,
            asset_params: AssetParamMap::new(),
            initial_prices: BTreeMap::new(),
            market_beta: 0.5,
            volume_threshold: 0.1,
            staleness_days: 180,
            staleness_haircut: 0.0,
            ruin_pct: 0.5,
            seed: None,
        }
    }
}

impl PortfolioSimulationConfig {
    /// Sets the initial capital.
    #[must_use]
    pub fn with_initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }

    /// Sets the number of steps.
    #[must_use]
    pub fn with_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Sets the number of paths.
    #[must_use]
    pub fn with_paths(mut self, num_paths: usize) -> Self {
        self.num_paths = num_paths;
        self
    }

    /// Adds or replaces one asset.
    #[must_use]
    pub fn with_asset(mut self, label: impl Into<String>, params: AssetParams) -> Self {
        self.asset_params.insert(label.into(), params);
        self
    }

    /// Replaces the asset map.
    #[must_use]
    pub fn with_assets(mut self, asset_params: AssetParamMap) -> Self {
        self.asset_params = asset_params;
        self
    }

    /// Sets one asset's initial price.
    #[must_use]
    pub fn with_initial_price(mut self, label: impl Into<String>, price: f64) -> Self {
        self.initial_prices.insert(label.into(), price);
        self
    }

    /// Sets the market factor loading.
    #[must_use]
    pub fn with_market_beta(mut self, market_beta: f64) -> Self {
        self.market_beta = market_beta;
        self
    }

    /// Sets the staleness rule.
    #[must_use]
    pub fn with_staleness(mut self, volume_threshold: f64, staleness_days: usize, haircut: f64) -> Self {
        self.volume_threshold = volume_threshold;
        self.staleness_days = staleness_days;
        self.staleness_haircut = haircut;
        self
    }

    /// Sets the ruin threshold fraction.
    #[must_use]
    pub fn with_ruin_pct(mut self, ruin_pct: f64) -> Self {
        self.ruin_pct = ruin_pct;
        self
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the scalar settings a run cannot repair on its own.
    ///
    /// Asset parameters and initial prices are not checked here: the runner
    /// floors volatility, clips beta and replaces bad prices itself.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(DomainError::invalid_parameter(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.ruin_pct.is_finite() && self.ruin_pct >= 0.0) {
            return Err(DomainError::invalid_parameter(format!(
                "ruin fraction must be non-negative, got {}",
                self.ruin_pct
            )));
        }
        if !(0.0..=1.0).contains(&self.staleness_haircut) {
            return Err(DomainError::invalid_parameter(format!(
                "staleness haircut must be within [0, 1], got {}",
                self.staleness_haircut
            )));
        }
        if !(self.volume_threshold.is_finite() && self.volume_threshold >= 0.0) {
            return Err(DomainError::invalid_parameter(format!(
                "volume threshold must be non-negative, got {}",
                self.volume_threshold
            )));
        }
        if !self.market_beta.is_finite() {
            return Err(DomainError::invalid_parameter("market beta must be finite"));
        }
        Ok(())
    }
}

/// Resolved per-asset simulation inputs.
#[derive(Debug, Clone)]
struct AssetModel {
    label: String,
    gbm: GeometricBrownianMotion,
    volume: SimulatedVolume,
    initial_price: f64,
}

/// Terminal holding values and staleness flags, path-major.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetOutcomes {
    /// Asset labels in simulation order.
    pub asset_labels: Vec<String>,
    num_paths: usize,
    /// Haircut-adjusted terminal value of each holding.
    values: Vec<f64>,
    /// Whether each holding was stale at the horizon.
    stale: Vec<bool>,
}

impl AssetOutcomes {
    fn num_assets(&self) -> usize {
        self.asset_labels.len()
    }

    /// Number of simulated paths.
    #[must_use]
    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    /// Terminal value of `asset` in `path`, after any haircut.
    #[must_use]
    pub fn value(&self, path: usize, asset: usize) -> f64 {
        self.values[path * self.num_assets() + asset]
    }

    /// Whether `asset` was stale at the end of `path`.
    #[must_use]
    pub fn is_stale(&self, path: usize, asset: usize) -> bool {
        self.stale[path * self.num_assets() + asset]
    }

    /// Portfolio value at the end of `path`.
    #[must_use]
    pub fn path_value(&self, path: usize) -> f64 {
        let k = self.num_assets();
        self.values[path * k..(path + 1) * k].iter().sum()
    }

    /// Whether any holding in `path` was stale.
    #[must_use]
    pub fn path_has_stale(&self, path: usize) -> bool {
        let k = self.num_assets();
        self.stale[path * k..(path + 1) * k].iter().any(|&s| s)
    }
}

/// Runs portfolio Monte Carlo simulations.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloRunner {
    pub config: PortfolioSimulationConfig,
}

impl MonteCarloRunner {
    /// Creates a runner for `config`.
    #[must_use]
    pub fn new(config: PortfolioSimulationConfig) -> Self {
        Self { config }
    }

    /// Runs the simulation and aggregates terminal values.
    #[must_use]
    pub fn run(&self) -> SimulationResult {
        self.run_detailed().0
    }

    /// Runs the simulation, also returning per-asset holding outcomes.
    #[must_use]
    pub fn run_detailed(&self) -> (SimulationResult, AssetOutcomes) {
        let cfg = &self.config;
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let assets = self.asset_models();
        info!(
            paths = cfg.num_paths,
            steps = cfg.num_steps,
            assets = assets.len(),
            seed = ?cfg.seed,
            "Starting portfolio Monte Carlo"
        );

        let outcomes = simulate_holdings(cfg, &assets, &mut rng);
        let result = aggregate(cfg, &outcomes);

        info!(
            mean = result.summary.mean,
            probability_of_ruin = result.probability_of_ruin,
            probability_of_ruin_staleness = result.probability_of_ruin_staleness,
            "Portfolio Monte Carlo complete"
        );
        (result, outcomes)
    }

    fn asset_models(&self) -> Vec<AssetModel> {
        let cfg = &self.config;
        let params: Vec<(String, AssetParams)> = if cfg.asset_params.is_empty() {
            warn!("No calibrated assets supplied; using the default asset");
            vec![(FALLBACK_ASSET.to_string(), AssetParams::FALLBACK)]
        } else {
            cfg.asset_params
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect()
        };

        params
            .into_iter()
            .map(|(label, p)| {
                let initial_price = match cfg.initial_prices.get(&label) {
                    Some(&price) if price.is_finite() && price > 0.0 => price,
                    Some(&price) => {
                        warn!(asset = %label, price, "Ignoring non-positive initial price");
                        DEFAULT_INITIAL_PRICE
                    }
                    None => DEFAULT_INITIAL_PRICE,
                };
                AssetModel {
                    gbm: GeometricBrownianMotion::daily(p.mu, p.sigma.max(MIN_SIGMA)),
                    volume: SimulatedVolume::new(p.liquidity_score),
                    initial_price,
                    label,
                }
            })
            .collect()
    }
}

/// Runs a portfolio Monte Carlo for `config`.
#[must_use]
pub fn run_portfolio_monte_carlo(config: &PortfolioSimulationConfig) -> SimulationResult {
    MonteCarloRunner::new(config.clone()).run()
}

fn simulate_holdings(
    cfg: &PortfolioSimulationConfig,
    assets: &[AssetModel],
    rng: &mut StdRng,
) -> AssetOutcomes {
    let p_count = cfg.num_paths;
    let t_count = cfg.num_steps;
    let k_count = assets.len();

    let beta = cfg.market_beta.clamp(0.0, 1.0);
    let idio_weight = (1.0 - beta * beta).sqrt();

    let market: Vec<f64> = (0..p_count * t_count)
        .map(|_| rng.sample(StandardNormal))
        .collect();

    // Cumulative log-return of each (path, asset).
    let mut log_sums = vec![0.0_f64; p_count * k_count];
    for p in 0..p_count {
        for t in 0..t_count {
            let z_market = market[p * t_count + t];
            for (k, asset) in assets.iter().enumerate() {
                let z_idio: f64 = rng.sample(StandardNormal);
                let z = beta * z_market + idio_weight * z_idio;
                log_sums[p * k_count + k] += asset.gbm.log_increment(z);
            }
        }
    }
    drop(market);

    let mut runs = vec![TrailingRun::default(); p_count * k_count];
    for p in 0..p_count {
        for _ in 0..t_count {
            for (k, asset) in assets.iter().enumerate() {
                let z_volume: f64 = rng.sample(StandardNormal);
                runs[p * k_count + k].observe(asset.volume.is_below(z_volume, cfg.volume_threshold));
            }
        }
    }

    let allocation = if k_count > 0 {
        cfg.initial_capital / k_count as f64
    } else {
        0.0
    };

    let mut values = Vec::with_capacity(p_count * k_count);
    let mut stale = Vec::with_capacity(p_count * k_count);
    for p in 0..p_count {
        for (k, asset) in assets.iter().enumerate() {
            let idx = p * k_count + k;
            let units = allocation / asset.initial_price;
            let terminal_price = asset.initial_price * log_sums[idx].exp();
            let is_stale = runs[idx].is_stale(cfg.staleness_days);
            values.push(units * terminal_price * value_multiplier(is_stale, cfg.staleness_haircut));
            stale.push(is_stale);
        }
    }
    debug!(
        stale_holdings = stale.iter().filter(|&&s| s).count(),
        "Evaluated terminal holdings"
    );

    AssetOutcomes {
        asset_labels: assets.iter().map(|a| a.label.clone()).collect(),
        num_paths: p_count,
        values,
        stale,
    }
}

fn aggregate(cfg: &PortfolioSimulationConfig, outcomes: &AssetOutcomes) -> SimulationResult {
    let final_values: Vec<f64> = (0..outcomes.num_paths())
        .map(|p| outcomes.path_value(p))
        .collect();

    let ruin_threshold = cfg.initial_capital * cfg.ruin_pct;
    let mut ruined = 0usize;
    let mut ruined_stale = 0usize;
    for (p, &value) in final_values.iter().enumerate() {
        if value < ruin_threshold {
            ruined += 1;
            if outcomes.path_has_stale(p) {
                ruined_stale += 1;
            }
        }
    }
    let fraction = |count: usize| {
        if final_values.is_empty() {
            0.0
        } else {
            count as f64 / final_values.len() as f64
        }
    };

    SimulationResult {
        summary: stats::summarize(&final_values),
        probability_of_ruin: fraction(ruined),
        probability_of_ruin_staleness: fraction(ruined_stale),
        staleness_days_threshold: cfg.staleness_days,
        asset_labels: outcomes.asset_labels.clone(),
        final_values,
    }
}
