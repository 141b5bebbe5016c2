//! Descriptive statistics over `f64` samples.
//!
//! Standard deviation is the population form (divide by `n`), and
//! percentiles interpolate linearly between the two closest ranks.

use ledger_mm_domain::value_objects::DistributionSummary;

/// Arithmetic mean, 0 for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 for an empty sample.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Returns a sorted copy of `values`.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Percentile `q` (0..=100) of an ascending slice.
///
/// Returns NaN for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Percentile `q` (0..=100) of an unordered sample.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    percentile_sorted(&sorted(values), q)
}

/// Mean, standard deviation and 5th/50th/95th percentiles.
pub fn summarize(values: &[f64]) -> DistributionSummary {
    if values.is_empty() {
        return DistributionSummary::default();
    }
    let s = sorted(values);
    DistributionSummary {
        mean: mean(values),
        std: std_dev(values),
        p5: percentile_sorted(&s, 5.0),
        p50: percentile_sorted(&s, 50.0),
        p95: percentile_sorted(&s, 95.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        assert!((std_dev(&v) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 75.0) - 3.25).abs() < 1e-12);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let v = [10.0, 1.0, 5.0];
        assert!((percentile(&v, 50.0) - 5.0).abs() < 1e-12);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_summarize() {
        let v: Vec<f64> = (1..=101).map(f64::from).collect();
        let s = summarize(&v);
        assert!((s.mean - 51.0).abs() < 1e-9);
        assert!((s.p5 - 6.0).abs() < 1e-9);
        assert!((s.p50 - 51.0).abs() < 1e-9);
        assert!((s.p95 - 96.0).abs() < 1e-9);
    }
}
