//! Backend addresses.
//!
//! # Responsibilities
//! - Parse and validate backend URLs from snapshot rules
//! - Build the upstream URI for a proxied request
//!
//! # Design Decisions
//! - Only plain `http` upstreams are usable
//! - Backend base path and request path are joined with a single slash
//! - Queries from both sides are kept, joined with `&`

use axum::http::uri::{PathAndQuery, Uri};
use url::Url;

/// Why a backend address was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InvalidBackend {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme '{0}'")]
    Scheme(String),

    #[error("missing host")]
    MissingHost,
}

/// A forwarding target (scheme + host + port, optional base path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    raw: String,
    url: Url,
    authority: String,
}

impl Backend {
    pub fn parse(raw: &str) -> Result<Self, InvalidBackend> {
        let raw = raw.trim();
        let url = Url::parse(raw)?;
        if url.scheme() != "http" {
            return Err(InvalidBackend::Scheme(url.scheme().to_string()));
        }

        let host = url.host_str().ok_or(InvalidBackend::MissingHost)?;
        let authority = match url.port_or_known_default() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            raw: raw.to_string(),
            url,
            authority,
        })
    }

    /// The address as it appeared in the snapshot.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `host:port` of the upstream.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Rewrite a request URI to point at this backend.
    pub fn target_uri(&self, request_uri: &Uri) -> Result<Uri, TargetUriError> {
        let path = join_paths(self.url.path(), request_uri.path());

        let query = match (self.url.query().unwrap_or(""), request_uri.query().unwrap_or("")) {
            ("", "") => None,
            (base, "") => Some(base.to_string()),
            ("", req) => Some(req.to_string()),
            (base, req) => Some(format!("{}&{}", base, req)),
        };

        let path_and_query: PathAndQuery = match query {
            Some(q) => format!("{}?{}", path, q).parse()?,
            None => path.parse()?,
        };

        let uri = Uri::builder()
            .scheme(self.url.scheme())
            .authority(self.authority.as_str())
            .path_and_query(path_and_query)
            .build()?;
        Ok(uri)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Failure to build an upstream URI.
#[derive(Debug, thiserror::Error)]
pub enum TargetUriError {
    #[error("invalid path: {0}")]
    Path(#[from] axum::http::uri::InvalidUri),

    #[error("invalid uri: {0}")]
    Build(#[from] axum::http::Error),
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
