//! Parameter estimation from noisy sale prints.
//!
//! Turns an asset's raw `(timestamp, price)` history into the annualized
//! drift, volatility and liquidity score consumed by the Monte Carlo engine.
//! Distress listings and outliers are removed first; see [`clean_prices`].

use crate::error::CalibrationError;
use crate::stats;
use ledger_mm_domain::entities::PricePoint;
use ledger_mm_domain::value_objects::{AssetParamMap, AssetParams, CalibratedParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;
/// Volatility assigned when the sample carries no usable dispersion.
pub const DEFAULT_SIGMA: f64 = 0.25;
/// Sales per month that map to a liquidity score of 1.
pub const REFERENCE_SALES_PER_MONTH: f64 = 10.0;
/// Minimum number of prices needed to estimate anything.
pub const MIN_PRICES: usize = 2;

/// Outlier filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Prices below this are treated as distress listings.
    pub min_price: f64,
    /// Tukey fence multiplier applied to the IQR.
    pub iqr_multiplier: f64,
    /// Lower percentile cut (0..=100).
    pub percentile_floor: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_price: 5.0,
            iqr_multiplier: 1.5,
            percentile_floor: 1.0,
        }
    }
}

impl CleaningConfig {
    /// Sets the minimum price.
    #[must_use]
    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = min_price;
        self
    }

    /// Sets the IQR multiplier.
    #[must_use]
    pub fn with_iqr_multiplier(mut self, iqr_multiplier: f64) -> Self {
        self.iqr_multiplier = iqr_multiplier;
        self
    }

    fn passes_floor(&self, price: f64) -> bool {
        price.is_finite() && price >= self.min_price
    }

    /// Inclusive `[low, high]` band of accepted prices for a floor-filtered
    /// sample, or `None` when the sample is too small to fence.
    fn acceptance_band(&self, prices: &[f64]) -> Option<(f64, f64)> {
        if prices.len() <= 2 {
            return None;
        }
        let s = stats::sorted(prices);
        let q1 = stats::percentile_sorted(&s, 25.0);
        let q3 = stats::percentile_sorted(&s, 75.0);
        let mut iqr = q3 - q1;
        if iqr <= 0.0 {
            iqr = stats::std_dev(prices);
            if iqr == 0.0 {
                iqr = 1e-6;
            }
        }
        let p_floor = stats::percentile_sorted(&s, self.percentile_floor);
        let low = self
            .min_price
            .max(p_floor)
            .max(q1 - self.iqr_multiplier * iqr);
        let high = q3 + self.iqr_multiplier * iqr;
        Some((low, high))
    }
}

/// Removes distress listings and outliers, preserving input order.
///
/// Not idempotent in general: the 1st-percentile fence sits strictly above
/// a unique minimum, so each pass over such a sample drops its lowest price.
/// A second pass changes nothing when the surviving minimum is repeated and
/// the IQR fences of the survivors admit them all.
pub fn clean_prices(prices: &[f64], config: &CleaningConfig) -> Vec<f64> {
    let floored: Vec<f64> = prices
        .iter()
        .copied()
        .filter(|&p| config.passes_floor(p))
        .collect();
    match config.acceptance_band(&floored) {
        Some((low, high)) => floored
            .into_iter()
            .filter(|&p| p >= low && p <= high)
            .collect(),
        None => floored,
    }
}

/// [`clean_prices`] over timestamped points.
pub fn clean_price_points(points: &[PricePoint], config: &CleaningConfig) -> Vec<PricePoint> {
    let floored: Vec<PricePoint> = points
        .iter()
        .copied()
        .filter(|p| config.passes_floor(p.price))
        .collect();
    let prices: Vec<f64> = floored.iter().map(|p| p.price).collect();
    match config.acceptance_band(&prices) {
        Some((low, high)) => floored
            .into_iter()
            .filter(|p| p.price >= low && p.price <= high)
            .collect(),
        None => floored,
    }
}

/// Consecutive log returns of a time-ordered price series, non-finite
/// entries dropped.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| w[1].ln() - w[0].ln())
        .filter(|r| r.is_finite())
        .collect()
}

/// Annualized `(mu, sigma)` from per-period log returns.
///
/// Sigma falls back to [`DEFAULT_SIGMA`] when it is zero or not finite.
pub fn annualize(returns: &[f64]) -> (f64, f64) {
    let finite: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if finite.is_empty() {
        return (0.0, DEFAULT_SIGMA);
    }
    let mu = stats::mean(&finite) * PERIODS_PER_YEAR;
    let sigma = stats::std_dev(&finite) * PERIODS_PER_YEAR.sqrt();
    if sigma <= 0.0 || !sigma.is_finite() {
        return (mu, DEFAULT_SIGMA);
    }
    (mu, sigma)
}

/// Sales frequency normalized to `[0, 1]` against
/// [`REFERENCE_SALES_PER_MONTH`].
pub fn liquidity_score(num_sales: usize, span_days: f64) -> f64 {
    if span_days <= 0.0 {
        return 0.0;
    }
    let per_month = num_sales as f64 / (span_days / 30.0);
    (per_month / REFERENCE_SALES_PER_MONTH).clamp(0.0, 1.0)
}

fn span_days(points: &[PricePoint]) -> f64 {
    let first = points.iter().map(|p| p.timestamp).min();
    let last = points.iter().map(|p| p.timestamp).max();
    let days = match (first, last) {
        (Some(a), Some(b)) => (b - a).num_milliseconds() as f64 / 86_400_000.0,
        _ => 0.0,
    };
    days.max(1.0)
}

/// Calibrates per-asset parameters from raw price histories.
#[derive(Debug, Clone, Default)]
pub struct ParameterEstimator {
    pub cleaning: CleaningConfig,
}

impl ParameterEstimator {
    /// Creates an estimator with the given cleaning policy.
    #[must_use]
    pub fn new(cleaning: CleaningConfig) -> Self {
        Self { cleaning }
    }

    /// Estimates parameters for one asset.
    ///
    /// # Errors
    /// Returns [`CalibrationError::InsufficientData`] when fewer than two
    /// observations are supplied or fewer than two survive cleaning.
    pub fn estimate(&self, history: &[PricePoint]) -> Result<CalibratedParams, CalibrationError> {
        if history.len() < MIN_PRICES {
            return Err(CalibrationError::insufficient_data(MIN_PRICES, history.len()));
        }

        let mut cleaned = clean_price_points(history, &self.cleaning);
        debug!(
            raw = history.len(),
            cleaned = cleaned.len(),
            "Cleaned price history"
        );
        if cleaned.len() < MIN_PRICES {
            return Err(CalibrationError::insufficient_data(MIN_PRICES, cleaned.len()));
        }

        cleaned.sort_by_key(|p| p.timestamp);
        let prices: Vec<f64> = cleaned.iter().map(|p| p.price).collect();
        let (mu, sigma) = annualize(&log_returns(&prices));
        let liquidity = liquidity_score(cleaned.len(), span_days(history));

        Ok(CalibratedParams {
            params: AssetParams::new(mu, sigma, liquidity),
            n_observations: cleaned.len(),
        })
    }

    /// Estimates every asset in `histories`; failures are collected, never
    /// propagated.
    pub fn estimate_portfolio<'a, I>(&self, histories: I) -> CalibrationReport
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<PricePoint>)>,
    {
        let mut report = CalibrationReport::default();
        for (asset, history) in histories {
            match self.estimate(history) {
                Ok(params) => {
                    report.calibrated.insert(asset.clone(), params);
                }
                Err(err) => {
                    warn!(asset = %asset, error = %err, "Excluding asset from calibration");
                    report.failures.insert(asset.clone(), err);
                }
            }
        }
        report
    }
}

/// Outcome of a multi-asset calibration pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationReport {
    /// Successfully calibrated assets.
    pub calibrated: BTreeMap<String, CalibratedParams>,
    /// Assets excluded and why.
    pub failures: BTreeMap<String, CalibrationError>,
}

impl CalibrationReport {
    /// Parameter map ready for the Monte Carlo engine.
    #[must_use]
    pub fn asset_params(&self) -> AssetParamMap {
        self.calibrated
            .iter()
            .map(|(k, v)| (k.clone(), v.params))
            .collect()
    }

    /// Whether no asset could be calibrated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calibrated.is_empty()
    }
}

/// Calibrates one asset with the default cleaning policy.
///
/// # Errors
/// See [`ParameterEstimator::estimate`].
pub fn calibrate(history: &[PricePoint]) -> Result<CalibratedParams, CalibrationError> {
    ParameterEstimator::default().estimate(history)
}

/// Calibrates several assets with the default cleaning policy.
pub fn calibrate_portfolio(histories: &BTreeMap<String, Vec<PricePoint>>) -> CalibrationReport {
    ParameterEstimator::default().estimate_portfolio(histories)
}
