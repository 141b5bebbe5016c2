//! Fill events recorded during a backtest.
//!
//! Every simulated execution against the synthetic book is logged with the
//! period it happened in, so a run can be audited after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Our bid was hit.
    Buy,
    /// Our ask was lifted.
    Sell,
}

/// A simulated execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Period index in the observation sequence.
    pub step: usize,
    /// Period timestamp.
    pub timestamp: DateTime<Utc>,
    /// Fill direction.
    pub side: Side,
    /// Executed trade price the fill was matched against.
    pub price: f64,
    /// Units filled.
    pub size: u32,
    /// Net cash moved, negative for buys.
    pub cash_flow: f64,
    /// Realized P&L, sells only.
    pub realized_pnl: Option<f64>,
}

impl FillEvent {
    /// Creates a buy fill.
    #[must_use]
    pub fn buy(step: usize, timestamp: DateTime<Utc>, price: f64, size: u32, cost: f64) -> Self {
        Self {
            step,
            timestamp,
            side: Side::Buy,
            price,
            size,
            cash_flow: -cost,
            realized_pnl: None,
        }
    }

    /// Creates a sell fill.
    #[must_use]
    pub fn sell(
        step: usize,
        timestamp: DateTime<Utc>,
        price: f64,
        size: u32,
        proceeds: f64,
        realized_pnl: f64,
    ) -> Self {
        Self {
            step,
            timestamp,
            side: Side::Sell,
            price,
            size,
            cash_flow: proceeds,
            realized_pnl: Some(realized_pnl),
        }
    }
}

/// Event log for collecting all fills during a backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    /// All recorded events.
    events: Vec<FillEvent>,
}

impl EventLog {
    /// Creates a new empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Records an event.
    pub fn record(&mut self, event: FillEvent) {
        self.events.push(event);
    }

    /// Returns all events.
    #[must_use]
    pub fn events(&self) -> &[FillEvent] {
        &self.events
    }

    /// Returns the count of events by side.
    #[must_use]
    pub fn count_by_side(&self, side: Side) -> usize {
        self.events.iter().filter(|e| e.side == side).count()
    }

    /// Realized P&L of every sell, in order.
    #[must_use]
    pub fn realized_pnls(&self) -> Vec<f64> {
        self.events.iter().filter_map(|e| e.realized_pnl).collect()
    }

    /// Total number of fills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no fill was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_log_record_and_query() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut log = EventLog::new();

        log.record(FillEvent::buy(0, ts, 100.0, 2, 196.5));
        log.record(FillEvent::sell(1, ts, 104.0, 1, 102.18, 5.75));
        log.record(FillEvent::sell(2, ts, 95.0, 1, 93.34, -3.25));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_by_side(Side::Buy), 1);
        assert_eq!(log.count_by_side(Side::Sell), 2);
        assert_eq!(log.realized_pnls(), vec![5.75, -3.25]);
        assert_eq!(log.events()[0].cash_flow, -196.5);
    }
}
