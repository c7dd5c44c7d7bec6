//! Mapping of dispatch failures to client responses.
//!
//! # Design Decisions
//! - No matching rule is 404 with a fixed body
//! - Backend unreachable is 502, backend timeout is 504
//! - Error details stay in the logs, not in response bodies

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::IngressError;

pub const NOT_FOUND_BODY: &str = "upstream server not found";

/// Status code a failed request is answered with.
pub fn status_for(error: &IngressError) -> StatusCode {
    match error {
        IngressError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        IngressError::BackendUnreachable { .. } | IngressError::InvalidTarget { .. } => {
            StatusCode::BAD_GATEWAY
        }
        IngressError::BackendTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = match status {
            StatusCode::NOT_FOUND => NOT_FOUND_BODY,
            StatusCode::BAD_GATEWAY => "bad gateway",
            StatusCode::GATEWAY_TIMEOUT => "gateway timeout",
            _ => "internal error",
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_not_found() {
        let error = IngressError::RouteNotFound {
            host: "foo.com".into(),
            path: "/".into(),
        };
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_timeout_is_504() {
        let error = IngressError::BackendTimeout {
            backend: "http://a:80".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(status_for(&error), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_other_errors_are_500() {
        assert_eq!(
            status_for(&IngressError::Cancelled),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
