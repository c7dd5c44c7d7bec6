//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, readiness wait, both listeners)
//!     → request.rs (request ID, routing host)
//!     → proxy.rs (current table → backend → forward)
//!     → response.rs (error → status code)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::{AppState, Forwarder};
pub use request::X_REQUEST_ID;
pub use server::IngressServer;
