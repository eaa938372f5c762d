//! Bounded, ordered buffer of recent samples.

use std::sync::Arc;

use super::sample::{Sample, SampleId};

/// Default maximum number of samples kept for display.
pub const MAX_DATA_POINTS: usize = 100;

/// Immutable, oldest-first sequence of at most `cap` samples.
///
/// Every update returns a new buffer and leaves the receiver untouched, so
/// consumers can detect a change with [`SampleBuffer::same_as`] instead of
/// comparing contents. Clones are cheap (shared storage).
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<Vec<Sample>>,
    cap: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(MAX_DATA_POINTS)
    }
}

impl SampleBuffer {
    /// Create an empty buffer holding at most `cap` samples (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            samples: Arc::new(Vec::new()),
            cap: cap.max(1),
        }
    }

    /// Install a bulk result delivered newest-first.
    ///
    /// The result is reversed to oldest-first. If it holds more than `cap`
    /// samples only the newest `cap` are kept.
    pub fn initialize(&self, newest_first: Vec<Sample>) -> Self {
        let mut samples = newest_first;
        samples.reverse();
        if samples.len() > self.cap {
            let excess = samples.len() - self.cap;
            samples.drain(..excess);
        }
        Self {
            samples: Arc::new(samples),
            cap: self.cap,
        }
    }

    /// Append one sample at the newest end, evicting exactly one sample
    /// from the oldest end when the cap is exceeded.
    pub fn append(&self, sample: Sample) -> Self {
        let mut samples = Vec::with_capacity(self.samples.len() + 1);
        samples.extend(self.samples.iter().cloned());
        samples.push(sample);
        if samples.len() > self.cap {
            samples.remove(0);
        }
        Self {
            samples: Arc::new(samples),
            cap: self.cap,
        }
    }

    /// The most recent `n` samples, newest first.
    pub fn latest_n(&self, n: usize) -> Vec<Sample> {
        self.samples.iter().rev().take(n).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Samples in chronological order (oldest first).
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn contains_id(&self, id: &SampleId) -> bool {
        self.samples.iter().any(|s| &s.id == id)
    }

    /// True if both values are the same buffer state (not just equal contents).
    pub fn same_as(&self, other: &SampleBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}
