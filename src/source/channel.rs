//! Channel-based data source.
//!
//! Receives feed events via a tokio mpsc channel. Background tasks (bulk
//! fetch, stream reader) hold the senders; the UI polls the receiver.

use tokio::sync::mpsc;

use super::{DataSource, FeedEvent};

/// A data source that receives feed events via a channel.
///
/// # Example
///
/// ```
/// use sensorwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("ws://127.0.0.1:8000/ws/data", 64);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<FeedEvent>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Wrap the receiving end of an event channel.
    pub fn new(receiver: mpsc::Receiver<FeedEvent>, description: &str) -> Self {
        Self {
            receiver,
            description: description.to_string(),
            closed: false,
        }
    }

    /// Create a channel pair with room for `capacity` queued events.
    pub fn create(description: &str, capacity: usize) -> (mpsc::Sender<FeedEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx, description))
    }

    /// Wait for the next event. Returns None once every sender is gone.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        let event = self.receiver.recv().await;
        if event.is_none() {
            self.closed = true;
        }
        event
    }

    /// True once all senders have been dropped and the queue is drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<FeedEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.closed.then(|| "source closed".to_string())
    }
}
