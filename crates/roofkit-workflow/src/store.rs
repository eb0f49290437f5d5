//! Local snapshot cache.
//!
//! A tiny string key-value capability injected into the workflow controller.
//! The controller only ever uses one fixed key; values are whole serialized
//! snapshots and every write replaces the previous value in full.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use roofkit_core::{Error, Result};
use roofkit_settings::StorageSettings;

/// Key-value storage for the serialized current snapshot.
pub trait LocalSnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl LocalSnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a cache directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the configured cache directory.
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.cache_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::storage(format!("invalid cache key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalSnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!("Wrote cache entry {}", path.display());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemorySnapshotStore::new();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
        store.delete("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("cache"));
        assert_eq!(store.get("roofing-measurements").unwrap(), None);

        store.set("roofing-measurements", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("roofing-measurements").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(!dir
            .path()
            .join("cache")
            .join("roofing-measurements.json.tmp")
            .exists());

        store.delete("roofing-measurements").unwrap();
        assert_eq!(store.get("roofing-measurements").unwrap(), None);
        // Deleting a missing entry is fine
        store.delete("roofing-measurements").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert!(matches!(store.set("../escape", "x"), Err(Error::Storage(_))));
    }
}
