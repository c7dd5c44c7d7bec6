//! Ingress router library.
//!
//! Terminates HTTP and HTTPS traffic for many virtual hosts and forwards
//! each request to the backend chosen by an atomically swappable routing
//! table. Snapshots of the desired routes and certificates are pushed in
//! through [`Ingress::on_snapshot`].

pub mod config;
pub mod error;
pub mod http;
pub mod ingress;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod snapshot;

pub use config::schema::ProxyConfig;
pub use error::IngressError;
pub use http::IngressServer;
pub use ingress::Ingress;
pub use lifecycle::Shutdown;
pub use net::Listeners;
pub use snapshot::{RuleEntry, Snapshot, TlsEntry};
