//! Request inspection.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Extract the routing host from URI authority or `Host` header
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An incoming `x-request-id` is kept, not replaced
//! - HTTP/2 carries the host in `:authority`, HTTP/1.1 in `Host`; the URI wins

use axum::http::header::{HeaderValue, HOST};
use axum::http::uri::Authority;
use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::normalize_host;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID header, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Normalized host the request is addressed to, without port.
pub fn request_host<B>(request: &Request<B>) -> Option<String> {
    let host = match request.uri().host() {
        Some(host) => host.to_string(),
        None => {
            let value = request.headers().get(HOST)?.to_str().ok()?;
            let authority: Authority = value.trim().parse().ok()?;
            authority.host().to_string()
        }
    };

    let host = normalize_host(&host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Raw authority to report as `X-Forwarded-Host`.
pub fn request_authority<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}
