//! Snapshot persistence.
//!
//! The engine hands every saved page to a [`SnapshotSink`] as an encoded
//! PNG keyed by page index. Sinks own failure handling; the engine only
//! logs a failed save and carries on.

mod file;
mod memory;

pub use file::FileSink;
pub use memory::MemorySink;

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found for page {0}")]
    NotFound(usize),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// An encoded, full-resolution rendering of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub page_index: usize,
    pub width: u32,
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl Snapshot {
    /// The snapshot as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Decode the payload of a `data:image/...;base64,` URL.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload).ok()
}

/// Receiver of page snapshots.
pub trait SnapshotSink: Send + Sync {
    /// Persist a snapshot. No acknowledgement beyond the result is implied.
    fn save(&self, snapshot: &Snapshot) -> StorageResult<()>;

    /// Encoded bytes of the most recent snapshot for a page.
    fn load(&self, page_index: usize) -> StorageResult<Vec<u8>>;
}
