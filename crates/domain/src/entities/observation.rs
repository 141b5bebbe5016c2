//! Per-period marketplace observations.
//!
//! An [`ObservationSequence`] is the canonical time series replayed by the
//! backtester: one record per period, strictly ordered by time. Missing
//! fields stay `None` and are never interpolated.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated market activity for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Start of the period.
    pub timestamp: DateTime<Utc>,
    /// Mean executed price of the prints in the period.
    pub trade_price: Option<f64>,
    /// Number of executed prints in the period.
    pub trade_volume: Option<f64>,
    /// Minimum concurrently listed price.
    pub best_ask: Option<f64>,
    /// Number of concurrent listings.
    pub listed_volume: Option<f64>,
}

impl Observation {
    /// Creates an observation with only a timestamp set.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            trade_price: None,
            trade_volume: None,
            best_ask: None,
            listed_volume: None,
        }
    }

    /// Sets the executed trade price and print count.
    #[must_use]
    pub fn with_trade(mut self, price: f64, volume: f64) -> Self {
        self.trade_price = Some(price);
        self.trade_volume = Some(volume);
        self
    }

    /// Sets the best ask snapshot.
    #[must_use]
    pub fn with_best_ask(mut self, best_ask: f64) -> Self {
        self.best_ask = Some(best_ask);
        self
    }

    /// Sets the listed volume.
    #[must_use]
    pub fn with_listed_volume(mut self, listed_volume: f64) -> Self {
        self.listed_volume = Some(listed_volume);
        self
    }

    /// Trade price if present and finite.
    #[must_use]
    pub fn trade_price(&self) -> Option<f64> {
        self.trade_price.filter(|p| p.is_finite())
    }

    /// Best ask if present and finite.
    #[must_use]
    pub fn best_ask(&self) -> Option<f64> {
        self.best_ask.filter(|p| p.is_finite())
    }

    /// Price the synthetic book is quoted around: the best ask when known,
    /// otherwise the executed trade price.
    #[must_use]
    pub fn reference_price(&self) -> Option<f64> {
        self.best_ask().or_else(|| self.trade_price())
    }
}

/// Time-ordered observations for a single asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSequence {
    observations: Vec<Observation>,
}

impl ObservationSequence {
    /// Creates a sequence from observations already in time order.
    ///
    /// # Errors
    /// Returns [`DomainError::NonMonotonicTimestamps`] if any timestamp is not
    /// strictly greater than its predecessor.
    pub fn new(observations: Vec<Observation>) -> Result<Self, DomainError> {
        if let Some(index) = observations
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(DomainError::non_monotonic(index + 1));
        }
        Ok(Self { observations })
    }

    /// Sorts observations by time before validating.
    ///
    /// # Errors
    /// Returns [`DomainError::NonMonotonicTimestamps`] if two observations
    /// share a period.
    pub fn from_unsorted(mut observations: Vec<Observation>) -> Result<Self, DomainError> {
        observations.sort_by_key(|o| o.timestamp);
        Self::new(observations)
    }

    /// Returns an empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the sequence has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterates over the periods in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Returns the periods as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    /// Whether no period carries a usable reference price.
    #[must_use]
    pub fn is_all_missing(&self) -> bool {
        self.observations
            .iter()
            .all(|o| o.reference_price().is_none())
    }
}

impl<'a> IntoIterator for &'a ObservationSequence {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_reference_price_prefers_best_ask() {
        let obs = Observation::new(day(0)).with_trade(100.0, 1.0).with_best_ask(102.0);
        assert_eq!(obs.reference_price(), Some(102.0));

        let obs = Observation::new(day(0)).with_trade(100.0, 1.0);
        assert_eq!(obs.reference_price(), Some(100.0));

        let obs = Observation::new(day(0));
        assert_eq!(obs.reference_price(), None);
    }

    #[test]
    fn test_nan_fields_treated_as_missing() {
        let obs = Observation::new(day(0)).with_trade(f64::NAN, 1.0);
        assert_eq!(obs.reference_price(), None);
    }

    #[test]
    fn test_sequence_rejects_duplicate_periods() {
        let obs = vec![Observation::new(day(0)), Observation::new(day(0))];
        let err = ObservationSequence::new(obs).unwrap_err();
        assert_eq!(err, DomainError::NonMonotonicTimestamps { index: 1 });
    }

    #[test]
    fn test_sequence_from_unsorted() {
        let obs = vec![
            Observation::new(day(2)),
            Observation::new(day(0)),
            Observation::new(day(1)),
        ];
        let seq = ObservationSequence::from_unsorted(obs).unwrap();
        let days: Vec<_> = seq.iter().map(|o| o.timestamp).collect();
        assert_eq!(days, vec![day(0), day(1), day(2)]);
    }

    #[test]
    fn test_all_missing() {
        let seq =
            ObservationSequence::new(vec![Observation::new(day(0)), Observation::new(day(1))])
                .unwrap();
        assert!(seq.is_all_missing());
        assert!(ObservationSequence::empty().is_all_missing());
    }
}
