//! Arrival-rate tracking for the status header.

use std::collections::VecDeque;
use std::time::Instant;

/// Maximum number of arrival instants to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Records when stream samples arrive so the UI can show samples/second.
#[derive(Debug, Clone, Default)]
pub struct ArrivalRate {
    arrivals: VecDeque<Instant>,
}

impl ArrivalRate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arrival now.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, at: Instant) {
        self.arrivals.push_back(at);
        if self.arrivals.len() > MAX_HISTORY_SIZE {
            self.arrivals.pop_front();
        }
    }

    /// Samples per second over the recorded window.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn per_second(&self) -> Option<f64> {
        if self.arrivals.len() < 2 {
            return None;
        }
        let first = self.arrivals.front()?;
        let last = self.arrivals.back()?;
        let elapsed = last.duration_since(*first).as_secs_f64();

        if elapsed > 0.0 {
            Some((self.arrivals.len() - 1) as f64 / elapsed)
        } else {
            None
        }
    }

    pub fn last_arrival(&self) -> Option<Instant> {
        self.arrivals.back().copied()
    }
}
