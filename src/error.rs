//! Error taxonomy for the ingress router.
//!
//! Per-request and per-handshake variants are contained by the dispatch
//! layer and mapped to protocol-level outcomes (see `http::response`).
//! Only listener lifecycle and startup variants reach `main`.

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::ConfigError;
use crate::snapshot::SnapshotError;

/// Errors produced by routing, dispatch and listener lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// No rule matched the request host and path.
    #[error("no route for host '{host}' and path '{path}'")]
    RouteNotFound { host: String, path: String },

    /// No certificate matched the TLS server name.
    #[error("no certificate for server name '{server_name}'")]
    CertificateNotFound { server_name: String },

    /// The resolved backend could not be reached.
    #[error("backend {backend} unreachable: {source}")]
    BackendUnreachable {
        backend: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The request URI could not be rewritten for the backend.
    #[error("cannot build upstream uri for {backend}: {source}")]
    InvalidTarget {
        backend: String,
        #[source]
        source: crate::routing::backend::TargetUriError,
    },

    /// The backend did not answer within the request timeout.
    #[error("backend {backend} timed out after {timeout:?}")]
    BackendTimeout { backend: String, timeout: Duration },

    /// A listener could not be bound. Fatal.
    #[error("failed to bind listener on {addr}: {source}")]
    ListenerBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A listener failed while serving. Fatal.
    #[error("listener on {addr} failed: {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    /// A wait was abandoned because shutdown was requested.
    #[error("cancelled by shutdown")]
    Cancelled,
}
