//! Snapshot Relay
//!
//! Polls a fleet of snapshot sources on a fixed interval and forwards each
//! payload to a single sink, with a global cap on in-flight cycles and
//! cooperative shutdown. It can be used as a library, or run as the
//! `snapshot-relay` binary which also hosts mock source and sink servers.
//!
//! # Architecture
//!
//! - **Collector**: per-source polling loops sharing an admission pool
//! - **Transport**: HTTP fetch from the source server and post to the sink
//! - **Server**: mock source and sink endpoints for local runs and tests
//! - **Config**: YAML configuration with environment overrides
//! - **Log**: the logging capability the collector writes through

pub mod collector;
pub mod config;
pub mod log;
pub mod server;
pub mod transport;

pub use collector::{
    AdmissionPool, Collector, CollectorConfig, CollectorError, Fetcher, Payload, Sender,
    SourceId, TransportError,
};
pub use config::{AppConfig, ConfigError, ServerConfig};
pub use log::{Logger, MemoryLogger, TracingLogger};
pub use transport::HttpTransport;
