//! In-memory snapshot sink.

use super::{Snapshot, SnapshotSink, StorageError, StorageResult};
use std::sync::RwLock;

/// Keeps every saved snapshot in memory, in save order.
#[derive(Default)]
pub struct MemorySink {
    snapshots: RwLock<Vec<Snapshot>>,
}

impl MemorySink {
    /// Create a new empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of saves received.
    pub fn save_count(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Latest snapshot for a page.
    pub fn latest(&self, page_index: usize) -> Option<Snapshot> {
        let snapshots = self.snapshots.read().ok()?;
        snapshots
            .iter()
            .rev()
            .find(|s| s.page_index == page_index)
            .cloned()
    }
}

impl SnapshotSink for MemorySink {
    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        snapshots.push(snapshot.clone());
        Ok(())
    }

    fn load(&self, page_index: usize) -> StorageResult<Vec<u8>> {
        self.latest(page_index)
            .map(|s| s.png)
            .ok_or(StorageError::NotFound(page_index))
    }
}
