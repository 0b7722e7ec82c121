//! File-backed key-value store
//!
//! All keys live in one JSON object file. Every write rewrites the whole
//! file through a temporary file and an atomic rename, so the file is
//! never left half-written. A missing file reads as an empty store. Reads
//! of a corrupt file fail; the next write moves it to `<file>.corrupt` and
//! starts over from an empty store.

use crate::store::KeyValueStore;
use setlist_core::{AppError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by the given file; nothing is touched until
    /// the first read or write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_contents(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AppError::storage_read(key, format!("cannot read {}", self.path.display()), e)
        })?;

        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    fn read_entries(&self, key: &str) -> Result<Entries> {
        let Some(contents) = self.read_contents(key)? else {
            return Ok(Entries::new());
        };

        serde_json::from_str(&contents).map_err(|e| {
            AppError::storage_read(
                key,
                format!("store file {} is not a JSON object", self.path.display()),
                e,
            )
        })
    }

    /// Reads the entries a write starts from
    ///
    /// An unparseable file is moved aside and treated as empty so later
    /// writes replace it.
    fn read_entries_for_write(&self, key: &str) -> Result<Entries> {
        let Some(contents) = self.read_contents(key)? else {
            return Ok(Entries::new());
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let corrupt = self.corrupt_path();
                log::warn!(
                    "Store file {} is not a JSON object ({}), moving it to {}",
                    self.path.display(),
                    e,
                    corrupt.display()
                );
                if let Err(e) = fs::rename(&self.path, &corrupt) {
                    log::warn!("Failed to move corrupt store file aside: {}", e);
                }
                Ok(Entries::new())
            }
        }
    }

    /// Path a corrupt store file is moved to before it is replaced
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn write_entries(&self, key: &str, entries: &Entries) -> Result<()> {
        let dir = self.parent_dir();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::storage_write(key, format!("cannot create {}", dir.display()), e)
            })?;
            log::info!("Created storage directory: {}", dir.display());
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::serialization("Failed to encode store file", e))?;

        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| AppError::storage_write(key, "cannot create temporary file", e))?;
        temp_file
            .write_all(json.as_bytes())
            .and_then(|_| temp_file.flush())
            .map_err(|e| AppError::storage_write(key, "cannot write temporary file", e))?;
        temp_file.persist(&self.path).map_err(|e| {
            AppError::storage_write(
                key,
                format!("cannot replace {}", self.path.display()),
                e.error,
            )
        })?;

        log::debug!("Wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Runs a read-modify-write cycle under the process-local lock
    fn modify<F>(&self, key: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self.write_lock.lock().map_err(|_| AppError::InternalError {
            message: format!("file store lock poisoned while writing '{}'", key),
        })?;

        let mut entries = self.read_entries_for_write(key)?;
        update(&mut entries);
        self.write_entries(key, &entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries(key)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.modify(key, |entries| {
            entries.remove(key);
        })
    }

    fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>> {
        let first = keys.first().copied().unwrap_or_default();
        let entries = self.read_entries(first)?;
        Ok(keys
            .iter()
            .map(|key| (key.to_string(), entries.get(*key).cloned()))
            .collect())
    }

    fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let first = pairs.first().map(|(key, _)| *key).unwrap_or_default();
        self.modify(first, |entries| {
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let first = keys.first().copied().unwrap_or_default();
        self.modify(first, |entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path().join("store.json"));
        (temp_dir, store)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_temp_dir, store) = setup_store();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_set_creates_file() {
        let (_temp_dir, store) = setup_store();
        store.set("k", "[1,2]").unwrap();

        assert!(store.path().exists());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_values_survive_new_instance() {
        let (_temp_dir, store) = setup_store();
        store.multi_set(&[("a", "1"), ("b", "2")]).unwrap();

        let reopened = FileStore::new(store.path());
        assert_eq!(
            reopened.multi_get(&["a", "b", "c"]).unwrap(),
            vec![
                ("a".to_string(), Some("1".to_string())),
                ("b".to_string(), Some("2".to_string())),
                ("c".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_set_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("a").join("b").join("store.json"));

        store.set("k", "true").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_remove_keeps_other_keys() {
        let (_temp_dir, store) = setup_store();
        store.multi_set(&[("a", "1"), ("b", "2"), ("c", "3")]).unwrap();

        store.remove_item("a").unwrap();
        store.multi_remove(&["c", "missing"]).unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c").unwrap(), None);
    }

    #[test]
    fn test_corrupted_file_is_read_error() {
        let (_temp_dir, store) = setup_store();
        fs::write(store.path(), "not json {{{").unwrap();

        let err = store.get("k").unwrap_err();
        assert!(matches!(err, AppError::StorageReadFailed { .. }));

        let err = store.multi_get(&["k"]).unwrap_err();
        assert!(matches!(err, AppError::StorageReadFailed { .. }));
    }

    #[test]
    fn test_write_replaces_corrupted_file() {
        let (_temp_dir, store) = setup_store();
        fs::write(store.path(), "not json {{{").unwrap();

        store.set("k", "1").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("1"));
        assert_eq!(
            fs::read_to_string(store.corrupt_path()).unwrap(),
            "not json {{{"
        );
    }

    #[test]
    fn test_remove_clears_corrupted_file() {
        let (_temp_dir, store) = setup_store();
        fs::write(store.path(), "[1, 2").unwrap();

        store.multi_remove(&["a", "b"]).unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.corrupt_path().exists());
    }

    #[test]
    fn test_empty_file_reads_empty() {
        let (_temp_dir, store) = setup_store();
        fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_same_content_same_bytes() {
        let (_temp_dir, store) = setup_store();
        store.multi_set(&[("b", "2"), ("a", "1")]).unwrap();
        let first = fs::read(store.path()).unwrap();

        store.multi_set(&[("a", "1"), ("b", "2")]).unwrap();
        let second = fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }
}
