//! Mock upstream and downstream servers.
//!
//! - [`source_router`]: answers `GET /snap.jpg` with a fixed snapshot
//! - [`sink_router`]: accepts `POST /image` and acknowledges it
//!
//! Both expose `GET /healthz` and can be run with [`serve`].

mod sink;
mod source;

use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use sink::{LoggingProcessor, PayloadProcessor, SINK_PATH, SinkState, sink_router};
pub use source::{DEFAULT_SNAPSHOT, SourceState, source_router};

/// Errors raised by the mock servers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload processor refused the payload.
    #[error("processing failed: {0}")]
    Process(String),
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness probe shared by both servers.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serve `router` on `listener` until `shutdown` is cancelled, then finish
/// in-flight requests and return.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
