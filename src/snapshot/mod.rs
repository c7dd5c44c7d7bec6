//! Snapshot subsystem.
//!
//! # Data Flow
//! ```text
//! Watcher (cluster observer, or file.rs for local runs)
//!     → Snapshot (immutable routing + TLS facts)
//!     → Ingress::on_snapshot
//!     → RoutingTable::build → RouteHolder::publish
//! ```
//!
//! # Design Decisions
//! - A snapshot is always a complete picture; each one replaces the last
//! - Entries are taken as-is; validation belongs to the producer
//! - Entry order is meaningful (ties go to the earliest entry)

pub mod file;

use serde::{Deserialize, Serialize};

pub use file::{load_snapshot, SnapshotWatcher};

/// Desired routing and TLS state, produced wholesale by a watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Snapshot {
    /// Ordered routing rules.
    pub rules: Vec<RuleEntry>,

    /// Ordered TLS certificate bindings.
    pub tls: Vec<TlsEntry>,
}

impl Snapshot {
    pub fn new(rules: Vec<RuleEntry>, tls: Vec<TlsEntry>) -> Self {
        Self { rules, tls }
    }
}

/// One `{host pattern, path prefix, backend}` rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleEntry {
    /// Exact host or `*.suffix` wildcard.
    pub host: String,

    /// Path prefix. Empty means `/`.
    #[serde(default)]
    pub path: String,

    /// Backend URL, e.g. `http://10.0.0.1:8080`.
    pub backend: String,
}

impl RuleEntry {
    pub fn new(host: impl Into<String>, path: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            backend: backend.into(),
        }
    }
}

/// Key-pair material bound to a host pattern.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TlsEntry {
    /// Exact host or `*.suffix` wildcard.
    pub host: String,

    /// PEM certificate chain.
    pub certificate: String,

    /// PEM private key.
    pub private_key: String,
}

impl TlsEntry {
    pub fn new(
        host: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            certificate: certificate.into(),
            private_key: private_key.into(),
        }
    }
}

// Keep key material out of logs.
impl std::fmt::Debug for TlsEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsEntry")
            .field("host", &self.host)
            .field("certificate_len", &self.certificate.len())
            .finish_non_exhaustive()
    }
}

/// Error type for reading snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
