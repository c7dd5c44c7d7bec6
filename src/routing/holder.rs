//! Hot-swap holder for the current routing table.
//!
//! Uses ArcSwap for lock-free atomic updates. Readers get a complete table
//! without blocking; writers replace the whole table in a single pointer
//! swap. Concurrent publishes are last-write-wins.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::table::RoutingTable;

#[derive(Debug)]
pub struct RouteHolder {
    current: ArcSwap<RoutingTable>,
}

impl RouteHolder {
    /// Create a holder publishing the empty table.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RoutingTable::empty()),
        }
    }

    /// Atomically replace the current table.
    ///
    /// Readers holding the previous table keep it until they drop it.
    pub fn publish(&self, table: Arc<RoutingTable>) {
        self.current.store(table);
    }

    /// The presently published table. Never blocks.
    pub fn current(&self) -> Arc<RoutingTable> {
        self.current.load_full()
    }
}

impl Default for RouteHolder {
    fn default() -> Self {
        Self::new()
    }
}
