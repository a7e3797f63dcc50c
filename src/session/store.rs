//! Snapshot Persistence
//!
//! Backends the session actor writes to on every `game-save`. One slot per
//! store: the latest snapshot replaces the previous one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::game::snapshot::{Snapshot, SnapshotError};

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Snapshot codec error: {0}")]
    Codec(#[from] SnapshotError),

    /// The store's lock was poisoned by a panicking writer.
    #[error("Snapshot store lock was poisoned")]
    LockPoisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for the latest snapshot of a session.
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> StoreResult<()>;

    /// Load the stored snapshot, if any.
    fn load(&self) -> StoreResult<Option<Snapshot>>;

    /// Remove the stored snapshot.
    fn clear(&self) -> StoreResult<()>;
}

/// In-memory store holding bincode bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the stored snapshot in bytes.
    pub fn stored_len(&self) -> usize {
        self.bytes
            .lock()
            .map(|b| b.as_ref().map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let encoded = snapshot.to_bytes()?;
        let mut bytes = self.bytes.lock().map_err(|_| StoreError::LockPoisoned)?;
        *bytes = Some(encoded);
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<Snapshot>> {
        let bytes = self.bytes.lock().map_err(|_| StoreError::LockPoisoned)?;
        match bytes.as_deref() {
            Some(data) => Ok(Some(Snapshot::from_bytes(data)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> StoreResult<()> {
        let mut bytes = self.bytes.lock().map_err(|_| StoreError::LockPoisoned)?;
        *bytes = None;
        Ok(())
    }
}

/// Store backed by a single JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing to `path`. Parent directories are created.
    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// File the snapshot is stored in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let json = snapshot.to_json()?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<Snapshot>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(Snapshot::from_json(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
