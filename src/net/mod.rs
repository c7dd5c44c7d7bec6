//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind plain + TLS sockets, fatal on failure)
//!
//! TLS connection
//!     → tls.rs (SNI → RoutingTable::resolve_certificate → handshake)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - One certificate lookup per handshake, always against the current table
//! - A failed lookup fails only that handshake

pub mod listener;
pub mod tls;

pub use listener::Listeners;
pub use tls::SniResolver;
