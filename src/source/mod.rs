//! Sources of feed events.
//!
//! Everything that can change the dashboard arrives as a [`FeedEvent`] on a
//! single queue: the one-shot bulk fetch, raw messages from the streaming
//! channel, and connection-state changes. The consumer drains the queue
//! through the [`DataSource`] trait and applies one event at a time.

mod channel;
pub mod fetch;
mod live;
pub mod reconnect;
mod stream;
pub mod websocket;

pub use channel::ChannelSource;
pub use live::{FeedHandle, LiveSource};
pub use reconnect::ReconnectConfig;
pub use stream::StreamSource;

use std::fmt::{self, Debug};
use std::time::Duration;

use crate::data::duration::format_duration;
use crate::data::Sample;

/// One event for the feed's single writer.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Bulk fetch result, newest-first as delivered by the backend.
    Bulk(Vec<Sample>),
    /// The bulk fetch failed; the buffer stays empty.
    FetchFailed(String),
    /// Raw payload of one stream message, decoded by the consumer.
    Message(String),
    /// The streaming channel changed state.
    Connection(ConnectionState),
}

/// State of the streaming channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    /// Waiting `delay` before reconnect attempt number `attempt`.
    Reconnecting { attempt: u32, delay: Duration },
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("live"),
            ConnectionState::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting #{} in {}", attempt, format_duration(*delay))
            }
            ConnectionState::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Trait for receiving feed events from various sources.
///
/// # Example
///
/// ```
/// use sensorwatch::{ChannelSource, DataSource, FeedEvent};
///
/// let (tx, mut source) = ChannelSource::create("example", 16);
/// tx.try_send(FeedEvent::Bulk(Vec::new())).unwrap();
/// assert_eq!(source.poll(), Some(FeedEvent::Bulk(Vec::new())));
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `Some(event)` if one is queued, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<FeedEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The last error reported by the source, if any.
    fn error(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_labels() {
        assert_eq!(ConnectionState::Connected.to_string(), "live");
        assert_eq!(
            ConnectionState::Reconnecting {
                attempt: 2,
                delay: Duration::from_millis(500)
            }
            .to_string(),
            "reconnecting #2 in 500ms"
        );
        assert!(!ConnectionState::default().is_connected());
    }
}
