//! Request dispatch to upstream backends.
//!
//! # Responsibilities
//! - Resolve each request against the current routing table
//! - Forward to the resolved backend and stream the response back
//! - Record per-request metrics and logs
//!
//! # Design Decisions
//! - The table is loaded once per request; a concurrent swap never
//!   affects a request already in flight
//! - Bodies stream in both directions, nothing is buffered
//! - No retries: a failed exchange is answered with 502 or 504
//! - The request timeout covers the exchange up to response headers

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{HeaderValue, HOST};
use axum::http::{Request, Version};
use axum::response::{IntoResponse, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::TimeoutConfig;
use crate::error::IngressError;
use crate::http::request::{request_authority, request_host, request_id};
use crate::http::response::status_for;
use crate::ingress::Ingress;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::routing::Backend;
use crate::security::headers::{append_forwarded, strip_hop_by_hop};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub ingress: Arc<Ingress>,
    pub forwarder: Forwarder,
    /// `"http"` or `"https"`, depending on the listener.
    pub scheme: &'static str,
}

/// HTTP client side of the proxy.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            request_timeout: timeouts.request(),
        }
    }

    /// Send `request` to `backend` and return its response.
    pub async fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
        client: SocketAddr,
        scheme: &'static str,
    ) -> Result<Response, IngressError> {
        let authority = request_authority(&request);
        let (mut parts, body) = request.into_parts();

        parts.uri = backend
            .target_uri(&parts.uri)
            .map_err(|source| IngressError::InvalidTarget {
                backend: backend.to_string(),
                source,
            })?;

        strip_hop_by_hop(&mut parts.headers);
        if let Some(authority) = &authority {
            append_forwarded(&mut parts.headers, client.ip(), scheme, authority);
            // HTTP/2 clients send no Host header; the backend still sees the original host.
            if !parts.headers.contains_key(HOST) {
                if let Ok(value) = HeaderValue::from_str(authority) {
                    parts.headers.insert(HOST, value);
                }
            }
        }
        // Upstream connections are HTTP/1.1 regardless of the client's version.
        parts.version = Version::HTTP_11;

        let upstream = Request::from_parts(parts, body);
        let response = with_timeout(backend.as_str(), self.request_timeout, async {
            self.client
                .request(upstream)
                .await
                .map_err(|source| IngressError::BackendUnreachable {
                    backend: backend.to_string(),
                    source,
                })
        })
        .await?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Catch-all handler: resolve, forward, report.
pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().to_string();
    let host = request_host(&request).unwrap_or_default();
    let path = request.uri().path().to_string();

    let table = state.ingress.current();
    let backend = match table.resolve_backend(&host, &path) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::debug!(request_id = %request_id, host = %host, path = %path, "No route matched");
            metrics::record_request(&method, status_for(&e).as_u16(), "none", start);
            return e.into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        host = %host,
        path = %path,
        backend = %backend,
        "Proxying request"
    );

    match state
        .forwarder
        .forward(backend, request, client, state.scheme)
        .await
    {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), backend.as_str(), start);
            response
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, backend = %backend, error = %e, "Upstream request failed");
            metrics::record_request(&method, status_for(&e).as_u16(), backend.as_str(), start);
            e.into_response()
        }
    }
}
