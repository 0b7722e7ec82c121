//! Key-value store contract and the in-memory backend

use setlist_core::{AppError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// A string-keyed store of UTF-8 JSON values
///
/// Implementations must be safe to share across threads: saves run on the
/// blocking pool while the session keeps dispatching.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key; removing an absent key succeeds
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Reads several keys, returning `(key, value)` pairs in request order
    fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>> {
        keys.iter()
            .map(|key| -> Result<(String, Option<String>)> {
                Ok((key.to_string(), self.get(key)?))
            })
            .collect()
    }

    /// Writes several pairs
    ///
    /// The default writes one key at a time. Backends that can write all
    /// pairs at once should override it.
    fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Removes several keys
    fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}

/// In-memory store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(key: &str) -> AppError {
        AppError::InternalError {
            message: format!("memory store lock poisoned while accessing '{}'", key),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.remove(key);
        Ok(())
    }

    fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Self::poisoned("multi_set"))?;
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
