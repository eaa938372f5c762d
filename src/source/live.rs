//! The live backend source: one bulk fetch plus the streaming channel.
//!
//! Both tasks start together and share one event queue, so stream messages
//! may arrive before the bulk result. The consumer sorts that out.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{fetch, websocket, ChannelSource};
use crate::config::Settings;
use crate::error::FeedError;

/// Queue depth between the network tasks and the consumer.
const EVENT_QUEUE: usize = 1024;

/// Handle to the background network tasks.
///
/// Dropping the handle cancels the streaming channel. An in-flight bulk
/// fetch is left to finish; its result is discarded once the source is gone.
#[derive(Debug)]
pub struct FeedHandle {
    cancel: CancellationToken,
    stream: Option<JoinHandle<()>>,
    fetch: JoinHandle<()>,
}

impl FeedHandle {
    /// Close the streaming channel and wait for it to stop.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.await {
                debug!(error = %e, "stream task ended abnormally");
            }
        }
    }

    /// True once the bulk fetch has reported.
    pub fn fetch_finished(&self) -> bool {
        self.fetch.is_finished()
    }

    /// True once the streaming channel has stopped for good.
    pub fn stream_finished(&self) -> bool {
        self.stream.as_ref().is_none_or(|s| s.is_finished())
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts the live backend tasks.
#[derive(Debug)]
pub struct LiveSource;

impl LiveSource {
    /// Spawn the bulk fetch and the streaming channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(settings: &Settings) -> Result<(ChannelSource, FeedHandle), FeedError> {
        let client = fetch::build_client(settings.fetch.timeout)?;
        let (tx, source) = ChannelSource::create(&settings.endpoints.stream_url, EVENT_QUEUE);
        let cancel = CancellationToken::new();

        info!(
            bulk_url = %settings.endpoints.bulk_url,
            stream_url = %settings.endpoints.stream_url,
            "starting live feed"
        );

        let fetch = tokio::spawn(fetch::run_fetch(
            client,
            settings.endpoints.bulk_url.clone(),
            tx.clone(),
        ));
        let stream = tokio::spawn(websocket::run_stream(
            settings.endpoints.stream_url.clone(),
            settings.reconnect.to_config(),
            tx,
            cancel.clone(),
        ));

        Ok((
            source,
            FeedHandle {
                cancel,
                stream: Some(stream),
                fetch,
            },
        ))
    }
}
