//! Streaming channel client over WebSocket.
//!
//! Connects to the push endpoint, forwards every text message as a raw
//! [`FeedEvent::Message`], and reconnects with exponential backoff when the
//! connection drops. Cancelling the token closes the socket and stops any
//! pending reconnect.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{ConnectionState, FeedEvent, ReconnectConfig};
use crate::error::FeedError;

/// Why a connected session ended.
#[derive(Debug)]
enum SessionEnd {
    Cancelled,
    ReceiverGone,
    Closed(String),
}

/// Run the streaming channel until cancelled, the event receiver is
/// dropped, or the reconnect limit is reached.
pub async fn run_stream(
    url: String,
    reconnect: ReconnectConfig,
    tx: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        if !notify(&tx, ConnectionState::Connecting).await {
            return;
        }

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = tokio_tungstenite::connect_async(url.as_str()) => result,
        };

        match connected {
            Ok((ws, _)) => {
                attempt = 0;
                info!(url = %url, "stream connected");
                if !notify(&tx, ConnectionState::Connected).await {
                    return;
                }
                match session(ws, &tx, &cancel).await {
                    SessionEnd::Cancelled => break,
                    SessionEnd::ReceiverGone => return,
                    SessionEnd::Closed(reason) => {
                        warn!(url = %url, reason = %reason, "stream disconnected");
                    }
                }
            }
            Err(e) => {
                let err = FeedError::from(e);
                warn!(url = %url, attempt, error = %err, "stream connect failed");
            }
        }

        attempt = attempt.saturating_add(1);
        if reconnect.exhausted(attempt) {
            info!(url = %url, attempts = attempt - 1, "giving up on stream reconnect");
            break;
        }

        let delay = reconnect.delay_for_attempt(attempt);
        info!(
            url = %url,
            attempt,
            delay_secs = format_args!("{:.1}", delay.as_secs_f64()),
            "reconnecting"
        );
        if !notify(&tx, ConnectionState::Reconnecting { attempt, delay }).await {
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("reconnect cancelled");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let _ = tx.send(FeedEvent::Connection(ConnectionState::Disconnected)).await;
}

/// Pump one connected socket until it ends.
async fn session<S>(
    ws: WebSocketStream<S>,
    tx: &mpsc::Sender<FeedEvent>,
    cancel: &CancellationToken,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                debug!("stream closed on shutdown");
                return SessionEnd::Cancelled;
            }

            msg = read.next() => {
                let payload = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!(len = data.len(), "dropping non-UTF-8 binary stream message");
                            continue;
                        }
                    },
                    Some(Ok(Message::Ping(data))) => {
                        trace!("received ping, sending pong");
                        let _ = write.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = match frame {
                            Some(f) => {
                                format!("close frame {} {}", u16::from(f.code), f.reason.as_str())
                            }
                            None => "close frame".to_string(),
                        };
                        return SessionEnd::Closed(reason);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return SessionEnd::Closed(FeedError::from(e).to_string()),
                    None => return SessionEnd::Closed("stream ended".to_string()),
                };

                trace!(len = payload.len(), "stream message");
                if tx.send(FeedEvent::Message(payload)).await.is_err() {
                    return SessionEnd::ReceiverGone;
                }
            }
        }
    }
}

/// Report a state change. Returns false when the receiver is gone.
async fn notify(tx: &mpsc::Sender<FeedEvent>, state: ConnectionState) -> bool {
    tx.send(FeedEvent::Connection(state)).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    fn fast_reconnect() -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(50),
            backoff_factor: 2.0,
            max_attempts: None,
        }
    }

    /// Next non-connection event, skipping state changes.
    async fn next_message(rx: &mut mpsc::Receiver<FeedEvent>) -> FeedEvent {
        loop {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for event")
                .expect("channel closed");
            if !matches!(event, FeedEvent::Connection(_)) {
                return event;
            }
        }
    }

    async fn wait_for_state(rx: &mut mpsc::Receiver<FeedEvent>, want: ConnectionState) {
        loop {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for state")
                .expect("channel closed");
            if event == FeedEvent::Connection(want.clone()) {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_forwards_text_messages() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Text(r#"{"id":1,"x":1,"y":2,"z":3}"#.into()))
                .await
                .unwrap();
            ws.send(Message::Text("not json".into())).await.unwrap();
            // Hold the connection open until the client goes away.
            while ws.next().await.is_some() {}
        });

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            format!("ws://{}", addr),
            fast_reconnect(),
            tx,
            cancel.clone(),
        ));

        assert_eq!(
            next_message(&mut rx).await,
            FeedEvent::Message(r#"{"id":1,"x":1,"y":2,"z":3}"#.to_string())
        );
        // Malformed payloads are passed through; decoding is the consumer's job.
        assert_eq!(
            next_message(&mut rx).await,
            FeedEvent::Message("not json".to_string())
        );

        cancel.cancel();
        wait_for_state(&mut rx, ConnectionState::Disconnected).await;
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_binary_frames_and_ping() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (pong_tx, pong_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Binary(vec![0xff, 0xfe].into())).await.unwrap();
            ws.send(Message::Binary(br#"{"id":7,"x":1,"y":2,"z":3}"#.to_vec().into()))
                .await
                .unwrap();
            ws.send(Message::Ping(b"hb".to_vec().into())).await.unwrap();

            let mut pong_tx = Some(pong_tx);
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Pong(data) = msg {
                    if &data[..] == b"hb" {
                        if let Some(tx) = pong_tx.take() {
                            let _ = tx.send(());
                        }
                    }
                }
            }
        });

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            format!("ws://{}", addr),
            fast_reconnect(),
            tx,
            cancel.clone(),
        ));

        // The invalid UTF-8 frame is dropped, so the JSON frame comes first.
        assert_eq!(
            next_message(&mut rx).await,
            FeedEvent::Message(r#"{"id":7,"x":1,"y":2,"z":3}"#.to_string())
        );
        timeout(Duration::from_secs(5), pong_rx)
            .await
            .expect("no pong for the server ping")
            .unwrap();

        cancel.cancel();
        wait_for_state(&mut rx, ConnectionState::Disconnected).await;
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_server_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // First session: one message, then close.
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Text("first".into())).await.unwrap();
            ws.close(None).await.unwrap();
            while ws.next().await.is_some() {}

            // Second session after the client reconnects.
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Text("second".into())).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            format!("ws://{}", addr),
            fast_reconnect(),
            tx,
            cancel.clone(),
        ));

        assert_eq!(next_message(&mut rx).await, FeedEvent::Message("first".to_string()));
        assert_eq!(next_message(&mut rx).await, FeedEvent::Message("second".to_string()));

        cancel.cancel();
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let reconnect = ReconnectConfig {
            max_attempts: Some(2),
            ..fast_reconnect()
        };
        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        timeout(
            Duration::from_secs(5),
            run_stream(format!("ws://{}", addr), reconnect, tx, cancel),
        )
        .await
        .expect("stream task should give up");

        let mut reconnects = 0;
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, FeedEvent::Connection(ConnectionState::Reconnecting { .. })) {
                reconnects += 1;
            }
            last = Some(event);
        }
        assert_eq!(reconnects, 2);
        assert_eq!(last, Some(FeedEvent::Connection(ConnectionState::Disconnected)));
    }

    #[tokio::test]
    async fn test_cancel_during_backoff() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let reconnect = ReconnectConfig {
            initial_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
            ..ReconnectConfig::default()
        };
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            format!("ws://{}", addr),
            reconnect,
            tx,
            cancel.clone(),
        ));

        loop {
            let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
            if matches!(event, FeedEvent::Connection(ConnectionState::Reconnecting { .. })) {
                break;
            }
        }
        cancel.cancel();
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }
}
