//! Core collector traits and types.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Opaque payload moved unchanged from a source to the sink.
pub type Payload = Bytes;

/// Identifier of a polled source, in `1..=source_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    /// Create a source id.
    ///
    /// Returns `None` for zero; ids are 1-based.
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Token identifying this source on the wire (`camera_{id}`).
    pub fn wire_token(&self) -> String {
        format!("camera_{}", self.0)
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failures of a single fetch or send call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, broken body stream.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Per-call deadline elapsed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Peer answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// Endpoint could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Capability failure that carries no transport detail.
    #[error("{0}")]
    Unavailable(String),
}

impl TransportError {
    /// Convenience constructor for [`TransportError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Whether this is a protocol-level failure (the peer answered, but not
    /// with success) as opposed to a transport-level one.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}

/// Errors surfaced by the collection engine.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Fetching from a source failed.
    #[error("source {source_id}: fetch failed: {error}")]
    Fetch {
        source_id: SourceId,
        #[source]
        error: TransportError,
    },

    /// Forwarding a fetched payload to the sink failed.
    #[error("source {source_id}: send failed: {error}")]
    Send {
        source_id: SourceId,
        #[source]
        error: TransportError,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A suspension point observed the shutdown signal.
    #[error("operation cancelled")]
    Cancelled,
}

impl CollectorError {
    /// Source the error belongs to, if any.
    pub fn source_id(&self) -> Option<SourceId> {
        match self {
            Self::Fetch { source_id, .. } | Self::Send { source_id, .. } => Some(*source_id),
            Self::Config(_) | Self::Cancelled => None,
        }
    }

    /// Whether the underlying transport error is a protocol error.
    pub fn is_protocol(&self) -> bool {
        match self {
            Self::Fetch { error, .. } | Self::Send { error, .. } => error.is_protocol(),
            Self::Config(_) | Self::Cancelled => false,
        }
    }
}

/// Capability: fetch the current payload of one source.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, source_id: SourceId) -> Result<Payload, TransportError>;
}

/// Capability: forward a payload to the sink.
#[async_trait::async_trait]
pub trait Sender: Send + Sync + 'static {
    async fn send(&self, payload: Payload) -> Result<(), TransportError>;
}
