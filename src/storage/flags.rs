/// Device-local idempotency flags
///
/// The streak award is guarded by a per-user, per-day flag that lives on the
/// local device rather than in the shared database. Keys look like
/// `streak_awarded:{user_id}:{YYYY-MM-DD}`; a flag is never cleared, the next
/// day simply uses a different key.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::UserId;

#[derive(Error, Debug)]
pub enum FlagStoreError {
    #[error("Flag file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Flag file serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Flag store lock poisoned")]
    Poisoned,
}

/// Get/set capability for boolean flags keyed by string
pub trait FlagStore: Send + Sync {
    /// Whether `key` has been set
    fn get_flag(&self, key: &str) -> bool;

    /// Mark `key` as set
    fn set_flag(&self, key: &str) -> Result<(), FlagStoreError>;
}

/// Key of the "streak already awarded" flag for a user and day
pub fn streak_flag_key(user_id: &UserId, date: NaiveDate) -> String {
    format!("streak_awarded:{}:{}", user_id, date.format("%Y-%m-%d"))
}

/// In-process flag store, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashSet<String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get_flag(&self, key: &str) -> bool {
        self.flags
            .lock()
            .map(|flags| flags.contains(key))
            .unwrap_or(false)
    }

    fn set_flag(&self, key: &str) -> Result<(), FlagStoreError> {
        let mut flags = self.flags.lock().map_err(|_| FlagStoreError::Poisoned)?;
        flags.insert(key.to_string());
        Ok(())
    }
}

/// Flag store backed by a JSON file on the local device
///
/// The file is read once at open and rewritten on every `set_flag`.
pub struct FileFlagStore {
    path: PathBuf,
    flags: Mutex<BTreeMap<String, bool>>,
}

impl FileFlagStore {
    /// Open the store at `path`; a missing or unreadable file starts empty
    pub fn open(path: PathBuf) -> Result<Self, FlagStoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = Self::load(&path);
        debug!("Loaded {} local flags from {}", flags.len(), path.display());

        Ok(Self {
            path,
            flags: Mutex::new(flags),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> BTreeMap<String, bool> {
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(flags) => flags,
                Err(err) => {
                    warn!("Failed to parse flag file {}: {}", path.display(), err);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("Failed to read flag file {}: {}", path.display(), err);
                BTreeMap::new()
            }
        }
    }
}

impl FlagStore for FileFlagStore {
    fn get_flag(&self, key: &str) -> bool {
        self.flags
            .lock()
            .map(|flags| flags.get(key).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    fn set_flag(&self, key: &str) -> Result<(), FlagStoreError> {
        let mut flags = self.flags.lock().map_err(|_| FlagStoreError::Poisoned)?;

        let mut updated = flags.clone();
        updated.insert(key.to_string(), true);

        // write first so memory never claims a flag the file lacks
        let payload = serde_json::to_vec_pretty(&updated)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, payload)?;
        std::fs::rename(&tmp_path, &self.path)?;

        *flags = updated;
        debug!("Set local flag {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flag_key_format() {
        let user = UserId::from_string("6f1c1f3e-6f3a-4d5e-9a8b-1c2d3e4f5a6b").unwrap();
        let key = streak_flag_key(&user, NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());
        assert_eq!(key, "streak_awarded:6f1c1f3e-6f3a-4d5e-9a8b-1c2d3e4f5a6b:2026-02-03");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFlagStore::new();
        assert!(!store.get_flag("a"));
        store.set_flag("a").unwrap();
        assert!(store.get_flag("a"));
        assert!(!store.get_flag("b"));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("flags.json");

        let store = FileFlagStore::open(path.clone()).unwrap();
        assert!(!store.get_flag("streak_awarded:x:2026-01-01"));
        store.set_flag("streak_awarded:x:2026-01-01").unwrap();

        let reopened = FileFlagStore::open(path).unwrap();
        assert!(reopened.get_flag("streak_awarded:x:2026-01-01"));
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flags.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileFlagStore::open(path).unwrap();
        assert!(!store.get_flag("anything"));
        store.set_flag("anything").unwrap();
        assert!(store.get_flag("anything"));
    }
}
