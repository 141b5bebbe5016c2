//! Calibration, backtesting and Monte Carlo engines.
//!
//! This crate provides the algorithmic core:
//! - Parameter estimation from noisy sale prints
//! - Synthetic order-book backtesting over an observation sequence
//! - Vectorized portfolio Monte Carlo with liquidity staleness and ruin

/// Prelude module for convenient imports.
pub mod prelude;

/// Synthetic order-book execution engine.
pub mod backtest;
/// Parameter estimation from price histories.
pub mod calibration;
/// Error types.
pub mod error;
/// Fill event log.
pub mod event;
/// Portfolio Monte Carlo engine.
pub mod monte_carlo;
/// GBM step model.
pub mod price_path;
/// Trailing staleness detection.
pub mod staleness;
/// Descriptive statistics.
pub mod stats;
/// Simulated trading volume.
pub mod volume;

pub use error::CalibrationError;
