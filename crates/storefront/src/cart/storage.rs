//! Key-value persistence for the cart.
//!
//! The cart only needs what browser local storage offers: string values
//! under string keys. [`MemoryStore`] keeps them in memory (tests, embedding)
//! and [`FileStore`] keeps one JSON file per key in a data directory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::error::StorageError;

/// A textual key-value store.
pub trait KeyValueStore {
    /// Get the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store.
///
/// Clones share the same map, so a clone handed to a second
/// [`CartStore`](super::CartStore) sees what the first one wrote, the way a
/// page reload sees local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// File-backed store: `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write never leaves a truncated cart behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the value files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let tmp_path = path.with_extension("json.tmp");
        let result =
            std::fs::write(&tmp_path, value).and_then(|()| std::fs::rename(&tmp_path, &path));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut store = MemoryStore::new();
        let reader = store.clone();

        store.set("cart", "[]").unwrap();
        assert_eq!(reader.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(reader.get("missing").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("fatmac_cart").unwrap(), None);

        store.set("fatmac_cart", "[1]").unwrap();
        store.set("fatmac_cart", "[2]").unwrap();
        assert_eq!(store.get("fatmac_cart").unwrap().as_deref(), Some("[2]"));

        // No temp file left behind
        assert!(!dir.path().join("nested/fatmac_cart.json.tmp").exists());
    }

    #[test]
    fn test_file_store_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the rename fail
        std::fs::create_dir_all(dir.path().join("fatmac_cart.json/occupied")).unwrap();
        let mut store = FileStore::new(dir.path());

        assert!(matches!(
            store.set("fatmac_cart", "[]"),
            Err(StorageError::Io(_))
        ));
        assert!(!dir.path().join("fatmac_cart.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", "cart.json"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
