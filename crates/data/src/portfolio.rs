//! Multi-asset calibration from sold-listing exports.

use crate::error::IngestError;
use crate::loader::load_sold;
use crate::series::price_history;
use ledger_mm_domain::entities::PricePoint;
use ledger_mm_simulation::calibration::{CalibrationReport, calibrate_portfolio};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loads a sold export as a calibration history.
///
/// # Errors
/// Returns an error if the file cannot be loaded.
pub fn load_price_history(path: impl AsRef<Path>) -> Result<Vec<PricePoint>, IngestError> {
    Ok(price_history(&load_sold(path)?))
}

/// Labels each export by its file stem, or `SKU_<index>` when it has none.
/// Later files win when two stems collide.
pub fn label_paths(paths: &[PathBuf]) -> BTreeMap<String, PathBuf> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let label = p
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .map_or_else(|| format!("SKU_{i}"), str::to_owned);
            (label, p.clone())
        })
        .collect()
}

/// Calibrates every asset in `paths` (asset id to sold export).
///
/// Files that cannot be loaded or hold no usable sales are skipped with a
/// warning; assets that fail calibration are reported in
/// [`CalibrationReport::failures`].
pub fn calibrate_files<P: AsRef<Path>>(paths: &BTreeMap<String, P>) -> CalibrationReport {
    let mut histories: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
    for (asset, path) in paths {
        let path = path.as_ref();
        match load_price_history(path) {
            Ok(history) if history.is_empty() => {
                warn!(asset = %asset, path = %path.display(), "No usable sales; skipping");
            }
            Ok(history) => {
                histories.insert(asset.clone(), history);
            }
            Err(e) => {
                warn!(asset = %asset, path = %path.display(), error = %e, "Skipping unreadable export");
            }
        }
    }

    let report = calibrate_portfolio(&histories);
    info!(
        files = paths.len(),
        calibrated = report.calibrated.len(),
        failed = report.failures.len(),
        "Calibrated assets from files"
    );
    report
}
