//! Ingress controller state shared by every listener.
//!
//! Owns the hot-swap holder and the readiness gate, and is the single
//! entry point for snapshot updates from the watcher.

use std::sync::Arc;

use crate::lifecycle::Readiness;
use crate::observability::metrics;
use crate::routing::{RouteHolder, RoutingTable};
use crate::snapshot::Snapshot;

#[derive(Debug, Default)]
pub struct Ingress {
    routes: RouteHolder,
    readiness: Readiness,
}

impl Ingress {
    /// Create an ingress serving the empty table, not yet ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a snapshot: build, publish, open the readiness gate.
    ///
    /// Never fails. Unusable entries only shrink the resulting table.
    pub fn on_snapshot(&self, snapshot: &Snapshot) {
        let table = RoutingTable::build(snapshot);

        tracing::info!(
            rules = table.rule_count(),
            certificates = table.certificate_count(),
            skipped_rules = snapshot.rules.len() - table.rule_count(),
            "Applying routing snapshot"
        );
        metrics::record_snapshot_applied(table.rule_count(), table.certificate_count());

        self.routes.publish(Arc::new(table));
        self.readiness.signal();
    }

    /// The currently published routing table.
    pub fn current(&self) -> Arc<RoutingTable> {
        self.routes.current()
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }
}
