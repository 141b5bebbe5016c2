//! Trailing staleness detection.
//!
//! A holding is stale only when its low-volume run reaches the final step.
//! Runs that recovered before the end of the path never count.

/// Length of the current run of below-threshold days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrailingRun {
    length: usize,
}

impl TrailingRun {
    /// Feeds the next day; an active day resets the run.
    pub fn observe(&mut self, below_threshold: bool) {
        if below_threshold {
            self.length += 1;
        } else {
            self.length = 0;
        }
    }

    /// Days in the run ending at the last observed day.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether the run has reached `min_length`.
    #[must_use]
    pub fn is_stale(&self, min_length: usize) -> bool {
        self.length >= min_length
    }
}

/// Terminal value multiplier: `haircut` when stale, 1 otherwise.
pub fn value_multiplier(stale: bool, haircut: f64) -> f64 {
    if stale { haircut } else { 1.0 }
}
