//! Persistence of the connection record
//!
//! One small JSON document, overwritten on each connect and removed on
//! disconnect.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::storage::models::PersistedConnection;

/// File name of the connection record inside the data directory
pub const CONNECTION_FILE: &str = "connection.json";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Client-local persistent store for [`PersistedConnection`]
pub trait ConnectionStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedConnection>, StorageError>;

    fn save(&self, record: &PersistedConnection) -> Result<(), StorageError>;

    /// Remove the record; removing a missing record is not an error
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileConnectionStore {
    path: PathBuf,
}

impl FileConnectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/connection.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CONNECTION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionStore for FileConnectionStore {
    fn load(&self) -> Result<Option<PersistedConnection>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&json) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // A corrupt record cannot be reconnected to; treat as absent.
                log::warn!(
                    "Ignoring unreadable connection record at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, record: &PersistedConnection) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store, for embedders without a filesystem and for tests
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    record: Mutex<Option<PersistedConnection>>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedConnection) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl ConnectionStore for MemoryConnectionStore {
    fn load(&self) -> Result<Option<PersistedConnection>, StorageError> {
        self.record
            .lock()
            .map(|r| r.clone())
            .map_err(|_| StorageError::Unavailable("connection store lock poisoned".to_string()))
    }

    fn save(&self, record: &PersistedConnection) -> Result<(), StorageError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("connection store lock poisoned".to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("connection store lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
