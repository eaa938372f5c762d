//! Sample records and the live buffer.
//!
//! ## Submodules
//!
//! - [`sample`]: Wire records ([`Sample`], [`SampleId`]) and timestamp handling
//! - [`buffer`]: The bounded, oldest-first [`SampleBuffer`]
//! - [`feed`]: [`LiveFeed`], the single writer that applies feed events
//! - [`rate`]: Arrival-rate tracking for the header
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! FeedEvent::Bulk (newest-first)      FeedEvent::Message (raw JSON)
//!        │                                   │
//!        ▼                                   ▼
//! SampleBuffer::initialize()          Sample::from_message()
//!        │                                   │
//!        └──────────────▶ LiveFeed ◀─────────┘
//!                           │
//!                           ├──▶ SampleBuffer::append() (evicts oldest at cap)
//!                           │
//!                           └──▶ watch::Sender (new buffer value per change)
//! ```

pub mod buffer;
pub mod duration;
pub mod feed;
pub mod rate;
pub mod sample;

pub use buffer::{SampleBuffer, MAX_DATA_POINTS};
pub use feed::LiveFeed;
pub use rate::ArrivalRate;
pub use sample::{Sample, SampleId};
