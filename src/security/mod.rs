//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → forward to backend
//! Backend response:
//!     → headers.rs (strip hop-by-hop)
//!     → client
//! ```
//!
//! # Design Decisions
//! - No trust in client input: forwarded headers are appended, not replaced

pub mod headers;
