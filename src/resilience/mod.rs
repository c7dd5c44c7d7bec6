//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → connector connect timeout
//!     → timeouts.rs (whole-exchange deadline)
//!     → failure mapped to 502 / 504, never to a listener error
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: the request body streams through once

pub mod timeouts;
