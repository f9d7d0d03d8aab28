//! Transports realizing the [`Fetcher`](crate::collector::Fetcher) and
//! [`Sender`](crate::collector::Sender) capabilities.
//!
//! - [`HttpTransport`]: snapshot `GET` from the source server, `POST` to the sink

mod http;

pub use http::{HttpTransport, PAYLOAD_CONTENT_TYPE, SNAPSHOT_PATH, SOURCE_ID_HEADER};
