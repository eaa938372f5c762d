//! The single writer for the sample buffer.
//!
//! [`LiveFeed`] applies [`FeedEvent`]s one at a time, owns the current
//! [`SampleBuffer`], and publishes every new buffer value on a watch channel.

use std::collections::VecDeque;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use super::buffer::SampleBuffer;
use super::rate::ArrivalRate;
use super::sample::Sample;
use crate::source::{ConnectionState, FeedEvent};

/// Owns the buffer and applies feed events to it.
#[derive(Debug)]
pub struct LiveFeed {
    buffer: SampleBuffer,
    /// Stream samples received before the bulk load, oldest first.
    pending: VecDeque<Sample>,
    initialized: bool,
    connection: ConnectionState,
    fetch_error: Option<String>,
    dropped: u64,
    rate: ArrivalRate,
    notifier: watch::Sender<SampleBuffer>,
    last_updated: Option<Instant>,
}

impl LiveFeed {
    /// Create an empty, uninitialized feed holding at most `cap` samples.
    pub fn new(cap: usize) -> Self {
        let buffer = SampleBuffer::new(cap);
        let (notifier, _) = watch::channel(buffer.clone());
        Self {
            buffer,
            pending: VecDeque::new(),
            initialized: false,
            connection: ConnectionState::default(),
            fetch_error: None,
            dropped: 0,
            rate: ArrivalRate::new(),
            notifier,
            last_updated: None,
        }
    }

    /// Watch the buffer. The receiver sees every published value.
    pub fn subscribe(&self) -> watch::Receiver<SampleBuffer> {
        self.notifier.subscribe()
    }

    /// Current buffer value.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Apply one event. Returns true when the buffer changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::Bulk(samples) => self.install(samples),
            FeedEvent::FetchFailed(reason) => {
                error!(reason = %reason, "bulk load failed, buffer stays empty");
                self.fetch_error = Some(reason);
                false
            }
            FeedEvent::Message(raw) => self.apply_message(&raw),
            FeedEvent::Connection(state) => {
                if state != self.connection {
                    debug!(from = %self.connection, to = %state, "connection state");
                }
                self.connection = state;
                false
            }
        }
    }

    /// Decode one stream message and append it.
    ///
    /// Malformed messages are logged, counted and dropped.
    pub fn apply_message(&mut self, raw: &str) -> bool {
        match Sample::from_message(raw) {
            Ok(sample) => self.push(sample),
            Err(e) => {
                self.dropped += 1;
                warn!(error = %e, dropped = self.dropped, "dropping stream message");
                false
            }
        }
    }

    /// Append one decoded sample, or hold it until the bulk load installs.
    pub fn push(&mut self, sample: Sample) -> bool {
        self.rate.record();
        if !self.initialized {
            trace!(id = %sample.id, "holding sample until bulk load");
            self.pending.push_back(sample);
            if self.pending.len() > self.buffer.cap() {
                self.pending.pop_front();
            }
            return false;
        }
        trace!(id = %sample.id, "appending sample");
        let next = self.buffer.append(sample);
        self.publish(next);
        true
    }

    fn install(&mut self, newest_first: Vec<Sample>) -> bool {
        if self.initialized {
            warn!(count = newest_first.len(), "ignoring repeated bulk load");
            return false;
        }

        let received = newest_first.len();
        let mut next = self.buffer.initialize(newest_first);
        self.initialized = true;
        self.fetch_error = None;

        let mut replayed = 0;
        for sample in self.pending.drain(..) {
            if next.contains_id(&sample.id) {
                continue;
            }
            next = next.append(sample);
            replayed += 1;
        }

        info!(received, installed = next.len(), replayed, "buffer initialized");
        self.publish(next);
        true
    }

    fn publish(&mut self, next: SampleBuffer) {
        self.buffer = next.clone();
        self.last_updated = Some(Instant::now());
        self.notifier.send_replace(next);
    }

    /// True once the bulk load has been installed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Reason the bulk load failed, if it did.
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Stream messages dropped as malformed.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn rate(&self) -> &ArrivalRate {
        &self.rate
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }
}
