//! Capital & profit model for a market-making desk.
//!
//! Relates the share of a marketplace's monthly volume the desk executes to
//! gross profit and the working capital tied up in inventory. All amounts are
//! in the marketplace's native currency.

use crate::value_objects::percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Capture levels used by [`CapitalModel::sensitivity`].
pub const SENSITIVITY_CAPTURE_PCT: [u32; 4] = [1, 5, 10, 15];
/// Yield levels used by [`CapitalModel::sensitivity`].
pub const SENSITIVITY_YIELD_PCT: [u32; 3] = [5, 10, 15];

/// Inputs to the capital model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalModel {
    /// Total monthly market volume.
    pub monthly_volume: Decimal,
    /// Share of market volume the desk executes.
    pub capture: Percentage,
    /// Sourcing alpha plus captured spread, per unit of volume.
    pub total_yield: Percentage,
    /// Days an average item sits in inventory.
    pub turnover_days: u32,
}

/// Derived capital model outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalProjection {
    pub monthly_volume_captured: Decimal,
    pub monthly_gross_profit: Decimal,
    pub annual_run_rate: Decimal,
    pub required_working_capital: Decimal,
    /// Monthly gross profit over working capital, as a fraction.
    pub monthly_roi: Decimal,
}

/// One cell of the capture × yield sensitivity grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCell {
    pub capture: Percentage,
    pub total_yield: Percentage,
    pub monthly_gross_profit: Decimal,
}

impl Default for CapitalModel {
    fn default() -> Self {
        Self {
            monthly_volume: Decimal::from(218_000_000u64),
            capture: Percentage::from_bps(200),
            total_yield: Percentage::from_bps(800),
            turnover_days: 14,
        }
    }
}

impl CapitalModel {
    /// Evaluates the model.
    #[must_use]
    pub fn project(&self) -> CapitalProjection {
        let captured = self.monthly_volume * self.capture.0;
        let gross = captured * self.total_yield.0;
        let working_capital =
            captured * Decimal::from(self.turnover_days) / Decimal::from(30);
        let monthly_roi = if working_capital.is_zero() {
            Decimal::ZERO
        } else {
            gross / working_capital
        };

        CapitalProjection {
            monthly_volume_captured: captured,
            monthly_gross_profit: gross,
            annual_run_rate: gross * Decimal::from(12),
            required_working_capital: working_capital,
            monthly_roi,
        }
    }

    /// Monthly gross profit over the fixed capture × yield grid, row-major by
    /// capture level.
    #[must_use]
    pub fn sensitivity(&self) -> Vec<SensitivityCell> {
        SENSITIVITY_CAPTURE_PCT
            .iter()
            .flat_map(|&cap| {
                SENSITIVITY_YIELD_PCT.iter().map(move |&y| {
                    let capture = Percentage::from_bps(cap * 100);
                    let total_yield = Percentage::from_bps(y * 100);
                    SensitivityCell {
                        capture,
                        total_yield,
                        monthly_gross_profit: self.monthly_volume * capture.0 * total_yield.0,
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pitch_scenario() {
        let model = CapitalModel {
            monthly_volume: dec!(218000000),
            capture: Percentage::from_percent(dec!(5)),
            total_yield: Percentage::from_percent(dec!(10)),
            turnover_days: 30,
        };
        let p = model.project();
        assert_eq!(p.monthly_volume_captured, dec!(10900000));
        assert_eq!(p.monthly_gross_profit, dec!(1090000));
        assert_eq!(p.annual_run_rate, dec!(13080000));
        assert_eq!(p.required_working_capital, dec!(10900000));
        assert_eq!(p.monthly_roi, dec!(0.1));
    }

    #[test]
    fn test_faster_turnover_needs_less_capital() {
        let slow = CapitalModel {
            turnover_days: 30,
            ..Default::default()
        };
        let fast = CapitalModel {
            turnover_days: 15,
            ..Default::default()
        };
        let slow = slow.project();
        let fast = fast.project();
        assert_eq!(slow.monthly_gross_profit, fast.monthly_gross_profit);
        assert_eq!(
            fast.required_working_capital * dec!(2),
            slow.required_working_capital
        );
    }

    #[test]
    fn test_zero_capture_has_zero_roi() {
        let model = CapitalModel {
            capture: Percentage::from_bps(0),
            ..Default::default()
        };
        assert_eq!(model.project().monthly_roi, Decimal::ZERO);
    }

    #[test]
    fn test_sensitivity_grid() {
        let model = CapitalModel {
            monthly_volume: dec!(1000000),
            ..Default::default()
        };
        let grid = model.sensitivity();
        assert_eq!(grid.len(), 12);
        // 5% capture, 10% yield
        let cell = &grid[4];
        assert_eq!(cell.capture.0, dec!(0.05));
        assert_eq!(cell.total_yield.0, dec!(0.10));
        assert_eq!(cell.monthly_gross_profit, dec!(5000));
    }
}
