//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Bind listeners → Wait on readiness → Accept traffic
//!
//! Readiness (readiness.rs):
//!     First snapshot applied → gate opens → listener loops start accepting
//!
//! Shutdown (shutdown.rs):
//!     Signal received → cancel readiness wait / stop accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: bind failures are fatal before any waiting
//! - No traffic until the first routing table exists
//! - Shutdown has a grace period: open connections are cut after the deadline

pub mod readiness;
pub mod shutdown;
pub mod signals;

pub use readiness::Readiness;
pub use shutdown::Shutdown;
