//! File-backed snapshot source for running outside a cluster.
//!
//! Reads a JSON snapshot, applies it, then watches the file and re-applies
//! it on every change. A file that fails to parse is reported and the
//! current routing table stays in place.
//!
//! The parent directory is watched rather than the file: writers that
//! replace the file by rename (ConfigMap volumes, atomic saves) give it a
//! new inode on every update.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::ingress::Ingress;
use crate::snapshot::{Snapshot, SnapshotError};

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

/// Feeds snapshots from a file into an [`Ingress`].
pub struct SnapshotWatcher {
    path: PathBuf,
    ingress: Arc<Ingress>,
}

impl SnapshotWatcher {
    pub fn new(path: &Path, ingress: Arc<Ingress>) -> Self {
        Self {
            path: path.to_path_buf(),
            ingress,
        }
    }

    /// Apply the file once. Errors leave the current table untouched.
    pub fn apply_once(&self) -> Result<(), SnapshotError> {
        let snapshot = load_snapshot(&self.path)?;
        self.ingress.on_snapshot(&snapshot);
        Ok(())
    }

    /// Start the source: watch the file when `watch` is set, otherwise
    /// apply it once.
    ///
    /// An unreadable file is an error in both modes. A file that does not
    /// parse is an error only without `watch`; with `watch` it is logged and
    /// the next write is applied.
    pub fn start(self, watch: bool) -> Result<Option<RecommendedWatcher>, SnapshotError> {
        if watch {
            self.run().map(Some)
        } else {
            self.apply_once()?;
            Ok(None)
        }
    }

    /// Apply the file, then keep watching it in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, SnapshotError> {
        match self.apply_once() {
            Ok(()) => {}
            Err(e @ SnapshotError::Io(_)) => return Err(e),
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Initial snapshot load failed");
            }
        }

        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            SnapshotError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("snapshot path {:?} has no file name", self.path),
            ))
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let path = self.path.clone();
        let ingress = self.ingress.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if touches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        reload(&path, &ingress);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Snapshot watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Snapshot watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path, ingress: &Ingress) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        // Removed between rename steps; the next event brings the new file.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = ?path, "Snapshot file missing, waiting for the next change");
            return;
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to read snapshot, keeping current routing table");
            return;
        }
    };

    // Truncate-then-write shows up as an empty file first.
    if content.trim().is_empty() {
        tracing::debug!(path = ?path, "Snapshot file empty, waiting for the write to finish");
        return;
    }

    match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) => {
            tracing::info!(path = ?path, "Snapshot file changed, applying");
            ingress.on_snapshot(&snapshot);
        }
        Err(e) => {
            tracing::error!(
                path = ?path,
                error = %e,
                "Failed to parse snapshot, keeping current routing table"
            );
        }
    }
}
