//! Mock snapshot source.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::server::healthz_handler;
use crate::transport::{PAYLOAD_CONTENT_TYPE, SNAPSHOT_PATH, SOURCE_ID_HEADER};

/// JPEG SOI + APP0 markers; enough for a consumer to sniff the type.
pub const DEFAULT_SNAPSHOT: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

/// Shared source server state.
#[derive(Debug, Clone)]
pub struct SourceState {
    snapshot: Bytes,
}

impl Default for SourceState {
    fn default() -> Self {
        Self::new(Bytes::from_static(DEFAULT_SNAPSHOT))
    }
}

impl SourceState {
    /// Serve `snapshot` to every caller.
    pub fn new(snapshot: impl Into<Bytes>) -> Self {
        Self {
            snapshot: snapshot.into(),
        }
    }

    pub fn snapshot(&self) -> &Bytes {
        &self.snapshot
    }
}

/// Create the source server router.
pub fn source_router(state: SourceState) -> Router {
    Router::new()
        .route(SNAPSHOT_PATH, get(snapshot_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(Arc::new(state))
}

/// Return the fixed snapshot to any caller that identifies itself.
async fn snapshot_handler(State(state): State<Arc<SourceState>>, headers: HeaderMap) -> Response {
    let camera = headers
        .get(SOURCE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let Some(camera) = camera else {
        return (StatusCode::BAD_REQUEST, "Camera ID required").into_response();
    };

    tracing::info!(camera = %camera, "Serving snapshot request");
    (
        [(header::CONTENT_TYPE, PAYLOAD_CONTENT_TYPE)],
        state.snapshot.clone(),
    )
        .into_response()
}
