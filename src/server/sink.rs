//! Mock payload sink.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::server::{ServerError, healthz_handler};

/// Path payloads are posted to.
pub const SINK_PATH: &str = "/image";

/// Consumer of payloads accepted by the sink.
pub trait PayloadProcessor: Send + Sync + 'static {
    fn process(&self, payload: &[u8]) -> Result<(), ServerError>;
}

/// Processor that only logs the payload size.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProcessor;

impl PayloadProcessor for LoggingProcessor {
    fn process(&self, payload: &[u8]) -> Result<(), ServerError> {
        tracing::info!(bytes = payload.len(), "Processed payload");
        Ok(())
    }
}

/// Shared sink server state.
#[derive(Clone)]
pub struct SinkState {
    processor: Arc<dyn PayloadProcessor>,
}

impl Default for SinkState {
    fn default() -> Self {
        Self::new(Arc::new(LoggingProcessor))
    }
}

impl SinkState {
    pub fn new(processor: Arc<dyn PayloadProcessor>) -> Self {
        Self { processor }
    }
}

/// Create the sink server router.
///
/// Payloads of any size are accepted. Non-POST requests to [`SINK_PATH`]
/// get 405; other paths get 404.
pub fn sink_router(state: SinkState) -> Router {
    Router::new()
        .route(SINK_PATH, post(payload_handler))
        .layer(DefaultBodyLimit::disable())
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}

async fn payload_handler(State(state): State<SinkState>, body: Bytes) -> Response {
    match state.processor.process(&body) {
        Ok(()) => {
            tracing::debug!(bytes = body.len(), "Payload accepted");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Error processing payload");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image").into_response()
        }
    }
}
