//! File-based snapshot sink.

use super::{Snapshot, SnapshotSink, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each page as `page-<index>.png` in a directory.
pub struct FileSink {
    /// Directory holding the page files.
    base_path: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `base_path`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create snapshot directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a sink in the default location.
    ///
    /// On Linux: `~/.local/share/inkleaf/pages/`
    /// On Windows: `%LOCALAPPDATA%\inkleaf\pages\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("inkleaf").join("pages"))
    }

    /// File path for a page.
    pub fn page_path(&self, page_index: usize) -> PathBuf {
        self.base_path.join(format!("page-{}.png", page_index))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl SnapshotSink for FileSink {
    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let path = self.page_path(snapshot.page_index);
        fs::write(&path, &snapshot.png).map_err(|e| {
            log::warn!("Dropping snapshot for page {}: {}", snapshot.page_index, e);
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        log::debug!("Wrote {} ({} bytes)", path.display(), snapshot.png.len());
        Ok(())
    }

    fn load(&self, page_index: usize) -> StorageResult<Vec<u8>> {
        let path = self.page_path(page_index);
        if !path.exists() {
            return Err(StorageError::NotFound(page_index));
        }
        fs::read(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }
}
