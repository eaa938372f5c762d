//! # sensorwatch
//!
//! A terminal dashboard and library for live accelerometer readings.
//!
//! Samples are seeded once from a bulk HTTP endpoint and then extended one
//! at a time from a WebSocket push channel. The core is a bounded,
//! oldest-first [`SampleBuffer`] owned by a single writer ([`LiveFeed`]),
//! which publishes every new buffer value to subscribers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(LiveFeed)│    │(chart,  │    │         │ │
//! │  └────┬────┘    └──────────┘    │ table)  │    └─────────┘ │
//! │       │                         └─────────┘                │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── LiveSource (HTTP + WebSocket) | StreamSource│
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state: the source, the feed, and UI toggles
//! - **[`source`]**: Feed events ([`FeedEvent`]) and the [`DataSource`] trait, with
//!   the bulk fetch, the reconnecting WebSocket client, and an NDJSON stream reader
//! - **[`data`]**: Sample records, the bounded buffer, and the single-writer feed
//! - **[`config`]**: Layered [`Settings`] from defaults, file, and environment
//! - **[`ui`]**: Terminal rendering using ratatui: header, chart, readings table
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard against the default backend on 127.0.0.1:8000
//! sensorwatch
//!
//! # Log buffer changes without a terminal UI
//! sensorwatch --headless
//!
//! # Snapshot the bulk endpoint to a file
//! sensorwatch --export samples.json
//!
//! # Read newline-delimited samples from a TCP bridge
//! sensorwatch --connect localhost:9090
//! ```
//!
//! ### Driving the feed directly
//!
//! ```
//! use sensorwatch::{FeedEvent, LiveFeed, Sample};
//!
//! let mut feed = LiveFeed::new(100);
//! let updates = feed.subscribe();
//!
//! // Bulk results arrive newest-first.
//! feed.apply(FeedEvent::Bulk(vec![
//!     Sample::new(2, None, 0.5, -1.0, 980.0),
//!     Sample::new(1, None, 0.4, -1.1, 981.0),
//! ]));
//! feed.apply(FeedEvent::Message(r#"{"id":3,"x":0.6,"y":-0.9,"z":979}"#.to_string()));
//!
//! let buffer = updates.borrow();
//! assert_eq!(buffer.len(), 3);
//! assert_eq!(buffer.latest_n(1)[0].id.to_string(), "3");
//! ```
//!
//! ### As a library with stream source (TCP, etc.)
//!
//! ```no_run
//! use std::io::Cursor;
//! use sensorwatch::{App, Settings, StreamSource};
//!
//! # tokio_test::block_on(async {
//! // Example with a cursor (in practice, use TcpStream)
//! let data = b"{\"id\":1,\"x\":0,\"y\":0,\"z\":0}\n";
//! let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
//! let app = App::new(Box::new(source), &Settings::default());
//! # });
//! ```
//!
//! ### Against the live backend
//!
//! ```no_run
//! use sensorwatch::{LiveFeed, LiveSource, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let (mut source, handle) = LiveSource::spawn(&settings).unwrap();
//! let mut feed = LiveFeed::new(settings.buffer.max_points);
//!
//! while let Some(event) = source.recv().await {
//!     if feed.apply(event) {
//!         println!("{} samples", feed.buffer().len());
//!     }
//! }
//! handle.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{LiveFeed, Sample, SampleBuffer, SampleId, MAX_DATA_POINTS};
pub use error::FeedError;
pub use source::{
    ChannelSource, ConnectionState, DataSource, FeedEvent, FeedHandle, LiveSource,
    ReconnectConfig, StreamSource,
};
