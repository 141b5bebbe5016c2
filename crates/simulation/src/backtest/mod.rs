//! Synthetic order-book execution engine.
//!
//! Replays one asset's observation sequence period by period, quoting a bid
//! and ask around the latest reference price, deciding fills from historical
//! price and volume evidence, and accounting for cash, inventory and the
//! cost of holding stale stock.

pub mod config;
pub mod engine;
pub mod metrics;
pub mod order_book;
pub mod state;

pub use config::BacktestConfig;
pub use engine::{BacktestReport, Backtester, run_backtest};
pub use order_book::SyntheticQuote;
pub use state::InventoryState;
