//! Collection Engine
//!
//! Polls every source on a fixed interval and forwards each payload to the
//! sink. Each source runs in its own Tokio task; a shared admission pool caps
//! how many fetch+send cycles are in flight across all of them, and a single
//! cancellation token stops everything.
//!
//! # Architecture
//!
//! - [`Collector`]: spawns one loop per source, drains their errors into the log
//! - [`AdmissionPool`]: bounded slots shared by every source
//! - [`Fetcher`] / [`Sender`]: capabilities the loops consume
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snapshot_relay::collector::{Collector, CollectorConfig};
//! use snapshot_relay::log::TracingLogger;
//! use snapshot_relay::transport::HttpTransport;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CollectorConfig::new(3).with_sink_url("http://localhost:8081/image");
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let collector = Collector::new(config, transport.clone(), transport, Arc::new(TracingLogger))?;
//!
//! let shutdown = CancellationToken::new();
//! collector.start(shutdown).await?;
//! # Ok(())
//! # }
//! ```

mod admission;
mod config;
mod engine;
mod source;
mod traits;

pub use admission::{AdmissionPermit, AdmissionPool};
pub use config::{
    CollectorConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SINK_URL,
    DEFAULT_SOURCE_BASE_URL, DEFAULT_SOURCE_COUNT,
};
pub use engine::Collector;
pub use traits::{CollectorError, Fetcher, Payload, Sender, SourceId, TransportError};
