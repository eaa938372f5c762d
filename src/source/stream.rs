//! Stream-based data source.
//!
//! Reads newline-delimited sample JSON from any async byte stream, such as
//! a raw TCP connection to a sensor bridge. There is no bulk phase: the feed
//! is initialized empty and every line is treated as a stream message.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use super::{ChannelSource, ConnectionState, DataSource, FeedEvent};

/// Queue depth between the reader task and the consumer.
const STREAM_QUEUE: usize = 256;

/// A data source that receives samples from an async line stream.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use sensorwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"id\":1,\"x\":0,\"y\":0,\"z\":0}\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    inner: ChannelSource,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, inner) = ChannelSource::create(&format!("stream: {}", description), STREAM_QUEUE);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let set_error = |msg: String| {
                if let Ok(mut guard) = error_handle.lock() {
                    *guard = Some(msg);
                }
            };

            if tx.send(FeedEvent::Bulk(Vec::new())).await.is_err() {
                return;
            }
            let _ = tx.send(FeedEvent::Connection(ConnectionState::Connected)).await;

            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("line stream reached EOF");
                        set_error("Connection closed".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if tx.send(FeedEvent::Message(trimmed.to_string())).await.is_err() {
                            // Receiver dropped
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "line stream read failed");
                        set_error(format!("Read error: {}", e));
                        break;
                    }
                }
            }

            let _ = tx.send(FeedEvent::Connection(ConnectionState::Disconnected)).await;
        });

        Self { inner, last_error }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<FeedEvent> {
        self.inner.poll()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn error(&self) -> Option<String> {
        self.last_error
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .or_else(|| self.inner.error())
    }
}
