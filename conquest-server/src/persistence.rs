//! Durable session snapshots
//!
//! The store is a plain key-value surface: one snapshot per session code,
//! written after every accepted action and read back when a session is
//! looked up but not resident in memory.

use conquest_core::SessionState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Serializable snapshot of one session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Action-sequence counter at snapshot time
    pub seq: u64,
    pub saved_at_ms: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Key-value snapshot store
pub trait SnapshotStore: Send + Sync {
    fn put(&self, code: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
    fn get(&self, code: &str) -> Result<Option<SessionSnapshot>, StoreError>;
    fn remove(&self, code: &str) -> Result<(), StoreError>;
}

/// What to do with an accepted action when the durable store fails:
/// reject it, or commit in memory and carry on with a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistencePolicy {
    FailAction,
    ContinueInMemory,
}

/// In-memory store (tests, ephemeral servers)
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, SessionSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&self, code: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap()
            .insert(code.to_string(), snapshot.clone());
        Ok(())
    }

    fn get(&self, code: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        Ok(self.entries.read().unwrap().get(code).cloned())
    }

    fn remove(&self, code: &str) -> Result<(), StoreError> {
        self.entries.write().unwrap().remove(code);
        Ok(())
    }
}

/// File-per-session pretty JSON under a data directory
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Session codes become file names; keep them path-safe.
    fn path_for(&self, code: &str) -> PathBuf {
        let safe: String = code
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl SnapshotStore for JsonDirStore {
    fn put(&self, code: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(self.path_for(code), content)?;
        Ok(())
    }

    fn get(&self, code: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        match std::fs::read_to_string(self.path_for(code)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, code: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(code)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Milliseconds since the epoch; also the server's seed source.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
