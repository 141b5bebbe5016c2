//! Synthetic quotes and fill decisions.

use crate::event::Side;

/// A two-sided quote around a reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticQuote {
    pub reference: f64,
    pub bid: f64,
    pub ask: f64,
}

impl SyntheticQuote {
    /// Quotes the ask at the reference and the bid one spread below it.
    #[must_use]
    pub fn around(reference: f64, spread: f64) -> Self {
        Self {
            reference,
            bid: reference - reference * spread,
            ask: reference,
        }
    }

    /// Our quoted price on `side`.
    #[must_use]
    pub fn price(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.bid,
            Side::Sell => self.ask,
        }
    }

    /// Whether our quote on `side` would have executed against a print at
    /// `trade_price` with `scaled_volume` prints.
    ///
    /// A bid fills when it is within `proximity` below the print, an ask
    /// when it is within `proximity` above it.
    #[must_use]
    pub fn would_fill(&self, side: Side, trade_price: f64, scaled_volume: f64, proximity: f64) -> bool {
        if !trade_price.is_finite() || scaled_volume <= 0.0 {
            return false;
        }
        let quoted = self.price(side);
        match side {
            Side::Buy => quoted >= trade_price * (1.0 - proximity),
            Side::Sell => quoted <= trade_price * (1.0 + proximity),
        }
    }
}

/// Units filled: scaled volume rounded down, at least one, capped by `cap`.
#[must_use]
pub fn fill_size(scaled_volume: f64, cap: u32) -> u32 {
    let whole = scaled_volume.floor();
    let units = if whole >= 1.0 {
        whole.min(f64::from(u32::MAX)) as u32
    } else {
        1
    };
    units.min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_around_reference() {
        let q = SyntheticQuote::around(102.0, 0.02);
        assert_eq!(q.ask, 102.0);
        assert!((q.bid - 99.96).abs() < 1e-9);
        assert_eq!(q.price(Side::Sell), 102.0);
    }

    #[test]
    fn test_fill_proximity() {
        let q = SyntheticQuote::around(102.0, 0.02);
        assert!(q.would_fill(Side::Buy, 100.0, 1.0, 0.02));
        assert!(q.would_fill(Side::Sell, 100.0, 1.0, 0.02));
        // Ask too far above the print
        assert!(!q.would_fill(Side::Sell, 100.0, 1.0, 0.01));
        // Bid too far below the print
        let wide = SyntheticQuote::around(102.0, 0.10);
        assert!(!wide.would_fill(Side::Buy, 100.0, 1.0, 0.02));
    }

    #[test]
    fn test_no_fill_without_volume_or_price() {
        let q = SyntheticQuote::around(100.0, 0.0);
        assert!(!q.would_fill(Side::Buy, 100.0, 0.0, 0.02));
        assert!(!q.would_fill(Side::Sell, f64::NAN, 1.0, 0.02));
    }

    #[test]
    fn test_fill_size_floors_at_one_unit() {
        assert_eq!(fill_size(0.2, 10), 1);
        assert_eq!(fill_size(1.0, 10), 1);
        assert_eq!(fill_size(3.7, 10), 3);
        assert_eq!(fill_size(25.0, 4), 4);
        assert_eq!(fill_size(0.5, 0), 0);
    }
}
