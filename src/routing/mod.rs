//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot (rules + TLS entries)
//!     → table.rs (RoutingTable::build: host index, sorted path rules, key pairs)
//!     → holder.rs (atomic publish)
//!
//! Incoming request (host, path)            TLS handshake (server name)
//!     → holder.current()                       → holder.current()
//!     → resolve_backend                        → resolve_certificate
//!     → Backend or RouteNotFound               → CertifiedKey or CertificateNotFound
//! ```
//!
//! # Design Decisions
//! - Tables are compiled once per snapshot, immutable at runtime
//! - No regex in hot path (hash probes + prefix checks)
//! - Deterministic: same table + input always gives the same answer
//! - Exact host before wildcard, longest path prefix first

pub mod backend;
pub mod certificate;
pub mod holder;
pub mod host;
pub mod table;

pub use backend::Backend;
pub use holder::RouteHolder;
pub use host::{normalize_host, HostPattern};
pub use table::RoutingTable;
