//! One-shot bulk fetch of recent samples over HTTP.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::FeedEvent;
use crate::data::Sample;
use crate::error::FeedError;

/// Build the HTTP client used for the bulk fetch.
pub fn build_client(timeout: Duration) -> Result<Client, FeedError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(FeedError::from)
}

/// GET the bulk endpoint and decode its newest-first JSON array.
pub async fn fetch_bulk(client: &Client, url: &str) -> Result<Vec<Sample>, FeedError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FeedError::Fetch(format!(
            "server returned {}",
            response.status()
        )));
    }

    response
        .json::<Vec<Sample>>()
        .await
        .map_err(|e| FeedError::Fetch(format!("malformed response: {}", e)))
}

/// Run the bulk fetch once and report the outcome on `tx`.
///
/// There is no retry. If the receiver is gone by the time the response
/// arrives the result is discarded.
pub async fn run_fetch(client: Client, url: String, tx: mpsc::Sender<FeedEvent>) {
    let event = match fetch_bulk(&client, &url).await {
        Ok(samples) => {
            info!(url = %url, count = samples.len(), "bulk fetch complete");
            FeedEvent::Bulk(samples)
        }
        Err(e) => {
            error!(url = %url, error = %e, "bulk fetch failed");
            FeedEvent::FetchFailed(e.to_string())
        }
    };
    let _ = tx.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response and return the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/data/accelerometer", addr)
    }

    #[tokio::test]
    async fn test_fetch_bulk_decodes_array() {
        let url = serve_once(
            "200 OK",
            r#"[{"_id":"c","x":3,"y":3,"z":3},{"_id":"b","x":2,"y":2,"z":2},{"_id":"a","x":1,"y":1,"z":1}]"#,
        )
        .await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let samples = fetch_bulk(&client, &url).await.unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].id.to_string(), "c");
    }

    #[tokio::test]
    async fn test_fetch_bulk_rejects_error_status() {
        let url = serve_once("500 Internal Server Error", "{}").await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = fetch_bulk(&client, &url).await.unwrap_err();
        assert!(matches!(err, FeedError::Fetch(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_bulk_rejects_malformed_body() {
        let url = serve_once("200 OK", r#"{"detail":"not a list"}"#).await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = fetch_bulk(&client, &url).await.unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn test_run_fetch_reports_connection_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_client(Duration::from_secs(5)).unwrap();
        let (tx, mut rx) = mpsc::channel(1);
        run_fetch(client, format!("http://{}/data/accelerometer", addr), tx).await;

        match rx.recv().await {
            Some(FeedEvent::FetchFailed(reason)) => {
                assert!(reason.starts_with("bulk fetch failed"))
            }
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }
}
