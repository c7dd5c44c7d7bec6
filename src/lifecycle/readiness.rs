//! One-shot readiness gate.
//!
//! # States
//! - Unset: listeners hold off accepting
//! - Set: terminal; every current and future waiter passes
//!
//! # Design Decisions
//! - Backed by a watch channel so late waiters see the final state
//! - `signal` is idempotent
//! - Waiting is cancellable by any future (usually shutdown)

use std::future::Future;

use tokio::sync::watch;

use crate::error::IngressError;

#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Open the gate. Later calls are no-ops.
    pub fn signal(&self) {
        let opened = self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if opened {
            tracing::info!("Readiness gate opened");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate opens, or fail with [`IngressError::Cancelled`]
    /// if `cancel` completes first.
    pub async fn wait<F>(&self, cancel: F) -> Result<(), IngressError>
    where
        F: Future<Output = ()>,
    {
        let mut rx = self.tx.subscribe();
        tokio::select! {
            // The sender lives in `self`, so this never reports a closed channel.
            result = rx.wait_for(|ready| *ready) => result.map(|_| ()).map_err(|_| IngressError::Cancelled),
            _ = cancel => Err(IngressError::Cancelled),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
