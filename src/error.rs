//! Error types for the live feed.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised while feeding samples into the dashboard.
///
/// None of these are fatal to the feed: a failed bulk fetch leaves the
/// buffer empty, and a failed stream message is dropped.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The one-shot bulk fetch did not complete.
    #[error("bulk fetch failed: {0}")]
    Fetch(String),

    /// The streaming channel failed (connect, read, or protocol error).
    #[error("stream failure: {0}")]
    Stream(String),

    /// A single stream message could not be decoded as a sample.
    #[error("malformed sample: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Settings failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FeedError {
    /// True for failures on the streaming side, including single bad messages.
    pub fn is_stream_failure(&self) -> bool {
        matches!(self, FeedError::Stream(_) | FeedError::Malformed(_))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Fetch("request timed out".to_string())
        } else if err.is_connect() {
            FeedError::Fetch(format!("connection failed: {}", err))
        } else if let Some(status) = err.status() {
            FeedError::Fetch(format!("server returned {}", status))
        } else {
            FeedError::Fetch(err.to_string())
        }
    }
}

impl From<tungstenite::Error> for FeedError {
    fn from(err: tungstenite::Error) -> Self {
        FeedError::Stream(err.to_string())
    }
}
