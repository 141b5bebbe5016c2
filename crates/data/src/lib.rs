//! Marketplace data ingestion.
//!
//! Turns sold and active listing exports into the canonical inputs of the
//! engines: per-asset [`PricePoint`](ledger_mm_domain::entities::PricePoint)
//! histories for calibration and a daily
//! [`ObservationSequence`](ledger_mm_domain::entities::ObservationSequence)
//! for backtesting.

/// Error types.
pub mod error;
/// Listing records and field parsing.
pub mod listing;
/// JSON export loaders.
pub mod loader;
/// Multi-asset calibration from files.
pub mod portfolio;
/// Daily time-series construction.
pub mod series;

pub use error::IngestError;
pub use listing::{Listing, ListingSide};
pub use loader::{load_active, load_sold, parse_active, parse_sold};
pub use portfolio::{calibrate_files, label_paths, load_price_history};
pub use series::{build_daily_series, price_history};
