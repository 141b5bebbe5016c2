//! Domain model for collectibles market-making analysis.
//!
//! This crate holds the plain data shared by the calibration, backtest and
//! Monte Carlo engines:
//! - Observation sequences and raw price histories
//! - Calibrated per-asset parameters
//! - Backtest metrics and simulation results
//! - The capital & profit model

/// Capital & profit model.
pub mod capital;
/// Observations and price histories.
pub mod entities;
/// Domain errors.
pub mod error;
/// Value objects.
pub mod value_objects;

pub use error::DomainError;
