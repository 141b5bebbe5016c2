//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use ledger_mm_simulation::prelude::*;
//! ```

// Backtesting
pub use crate::backtest::{
    BacktestConfig, BacktestReport, Backtester, InventoryState, SyntheticQuote, run_backtest,
};

// Calibration
pub use crate::calibration::{
    CalibrationReport, CleaningConfig, ParameterEstimator, calibrate, calibrate_portfolio,
};

// Errors
pub use crate::error::CalibrationError;

// Events
pub use crate::event::{EventLog, FillEvent, Side};

// Monte Carlo
pub use crate::monte_carlo::{
    AssetOutcomes, MonteCarloRunner, PortfolioSimulationConfig, run_portfolio_monte_carlo,
};

// Price and volume models
pub use crate::price_path::GeometricBrownianMotion;
pub use crate::volume::SimulatedVolume;
