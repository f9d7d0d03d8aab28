//! HTTP transport.
//!
//! Fetches `GET {source_base_url}/snap.jpg` with the source identified by the
//! `X-Camera-ID` header, and forwards payloads with `POST {sink_url}`.

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use url::Url;

use crate::collector::{
    CollectorConfig, DEFAULT_REQUEST_TIMEOUT, Fetcher, Payload, Sender, SourceId, TransportError,
};

/// Path of the snapshot resource on the source server.
pub const SNAPSHOT_PATH: &str = "/snap.jpg";

/// Header carrying the source's wire token (`camera_{id}`).
pub const SOURCE_ID_HEADER: &str = "X-Camera-ID";

/// Content type declared when forwarding a payload.
pub const PAYLOAD_CONTENT_TYPE: &str = "image/jpeg";

/// Default client over HTTP/1.1 with a per-call timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    snapshot_url: Url,
    sink_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the collector's endpoints and request timeout.
    ///
    /// # Errors
    /// Returns `TransportError::InvalidUrl` if either endpoint does not parse,
    /// and `TransportError::Request` if the HTTP client cannot be built.
    pub fn new(config: &CollectorConfig) -> Result<Self, TransportError> {
        let timeout = if config.request_timeout.is_zero() {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            config.request_timeout
        };

        let base = config.source_base_url.trim_end_matches('/');
        let snapshot_url = parse_url(&format!("{base}{SNAPSHOT_PATH}"))?;
        let sink_url = parse_url(&config.sink_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Request)?;

        Ok(Self {
            client,
            snapshot_url,
            sink_url,
            timeout,
        })
    }

    /// Resolved snapshot URL.
    pub fn snapshot_url(&self) -> &Url {
        &self.snapshot_url
    }

    /// Resolved sink URL.
    pub fn sink_url(&self) -> &Url {
        &self.sink_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(err)
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("snapshot_url", &self.snapshot_url.as_str())
            .field("sink_url", &self.sink_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn parse_url(raw: &str) -> Result<Url, TransportError> {
    Url::parse(raw).map_err(|e| TransportError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait::async_trait]
impl Fetcher for HttpTransport {
    async fn fetch(&self, source_id: SourceId) -> Result<Payload, TransportError> {
        let response = self
            .client
            .get(self.snapshot_url.clone())
            .header(SOURCE_ID_HEADER, source_id.wire_token())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(
                source = %source_id,
                url = %self.snapshot_url,
                status = status.as_u16(),
                "Snapshot request rejected"
            );
            return Err(TransportError::Status(status.as_u16()));
        }

        let payload = response.bytes().await.map_err(|e| self.classify(e))?;
        tracing::trace!(source = %source_id, bytes = payload.len(), "Snapshot fetched");
        Ok(payload)
    }
}

#[async_trait::async_trait]
impl Sender for HttpTransport {
    async fn send(&self, payload: Payload) -> Result<(), TransportError> {
        let size = payload.len();
        let response = self
            .client
            .post(self.sink_url.clone())
            .header(header::CONTENT_TYPE, PAYLOAD_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(
                url = %self.sink_url,
                status = status.as_u16(),
                bytes = size,
                "Sink rejected payload"
            );
            return Err(TransportError::Status(status.as_u16()));
        }

        tracing::trace!(bytes = size, "Payload forwarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use tokio::net::TcpListener;

    /// Captured request for assertions.
    #[derive(Debug, Clone, Default)]
    struct Seen {
        camera_header: Option<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    async fn spawn_router(router: Router) -> Option<String> {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(l) => l,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => return None,
            Err(e) => panic!("Failed to bind test listener: {e}"),
        };
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Some(format!("http://{addr}"))
    }

    fn recording_router(seen: Arc<Mutex<Seen>>, status: AxumStatus) -> Router {
        let snap_seen = Arc::clone(&seen);
        let sink_seen = seen;
        Router::new()
            .route(
                "/snap.jpg",
                get(move |headers: HeaderMap| {
                    let seen = Arc::clone(&snap_seen);
                    async move {
                        seen.lock().unwrap().camera_header = headers
                            .get(SOURCE_ID_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        (status, Bytes::from_static(b"\xFF\xD8\xFF\xE0"))
                    }
                }),
            )
            .route(
                "/image",
                post(move |headers: HeaderMap, body: Bytes| {
                    let seen = Arc::clone(&sink_seen);
                    async move {
                        let mut seen = seen.lock().unwrap();
                        seen.content_type = headers
                            .get("content-type")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.body = body.to_vec();
                        status
                    }
                }),
            )
    }

    fn config_for(base: &str) -> CollectorConfig {
        CollectorConfig::new(1)
            .with_source_base_url(format!("{base}/"))
            .with_sink_url(format!("{base}/image"))
            .with_request_timeout(Duration::from_secs(2))
    }

    #[test]
    fn test_new_builds_snapshot_url_without_double_slash() {
        let config = CollectorConfig::new(1)
            .with_source_base_url("http://camera:8080/")
            .with_sink_url("http://target:8080/image");
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(transport.snapshot_url().as_str(), "http://camera:8080/snap.jpg");
        assert_eq!(transport.sink_url().as_str(), "http://target:8080/image");
    }

    #[test]
    fn test_new_rejects_invalid_sink_url() {
        let config = CollectorConfig::new(1).with_sink_url("not a url");
        let err = HttpTransport::new(&config).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = CollectorConfig::new(1).with_request_timeout(Duration::ZERO);
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_fetch_sends_camera_header_and_returns_body() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let Some(base) = spawn_router(recording_router(seen.clone(), AxumStatus::OK)).await else {
            return;
        };
        let transport = HttpTransport::new(&config_for(&base)).unwrap();

        let payload = transport.fetch(SourceId::new(2).unwrap()).await.unwrap();

        assert_eq!(payload.as_ref(), b"\xFF\xD8\xFF\xE0");
        assert_eq!(
            seen.lock().unwrap().camera_header.as_deref(),
            Some("camera_2")
        );
    }

    #[tokio::test]
    async fn test_send_posts_payload_as_jpeg() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let Some(base) = spawn_router(recording_router(seen.clone(), AxumStatus::OK)).await else {
            return;
        };
        let transport = HttpTransport::new(&config_for(&base)).unwrap();

        transport
            .send(Payload::from_static(b"test image"))
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.content_type.as_deref(), Some(PAYLOAD_CONTENT_TYPE));
        assert_eq!(seen.body, b"test image");
    }

    #[tokio::test]
    async fn test_non_ok_status_is_protocol_error() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let Some(base) =
            spawn_router(recording_router(seen, AxumStatus::SERVICE_UNAVAILABLE)).await
        else {
            return;
        };
        let transport = HttpTransport::new(&config_for(&base)).unwrap();

        let err = transport.fetch(SourceId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(503)));
        assert!(err.is_protocol());

        let err = transport
            .send(Payload::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status(503)));
    }

    #[tokio::test]
    async fn test_created_is_not_success() {
        // Only 200 counts as success on the wire.
        let seen = Arc::new(Mutex::new(Seen::default()));
        let Some(base) = spawn_router(recording_router(seen, AxumStatus::CREATED)).await else {
            return;
        };
        let transport = HttpTransport::new(&config_for(&base)).unwrap();

        let err = transport
            .send(Payload::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status(201)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port with no listener.
        let port = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(l) => l.local_addr().unwrap().port(),
            Err(_) => return,
        };
        let base = format!("http://127.0.0.1:{port}");
        let transport = HttpTransport::new(&config_for(&base)).unwrap();

        let err = transport.fetch(SourceId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)), "got {err:?}");
        assert!(!err.is_protocol());
    }

    #[tokio::test]
    async fn test_slow_peer_times_out() {
        let router = Router::new().route(
            "/snap.jpg",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let Some(base) = spawn_router(router).await else {
            return;
        };
        let config = config_for(&base).with_request_timeout(Duration::from_millis(100));
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.fetch(SourceId::new(1).unwrap()).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Timeout(d) if d == Duration::from_millis(100)),
            "got {err:?}"
        );
    }
}
