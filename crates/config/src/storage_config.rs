//! Playlist storage configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which key-value backend holds the playlist
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file in the data directory
    File,
    /// Process memory only; nothing survives a restart
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Store file name inside the data directory
    pub file_name: String,

    /// Key for the current songs and history cursor
    pub playlist_key: String,

    /// Key for the history snapshots
    pub history_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            file_name: "playlist.json".to_string(),
            playlist_key: "@playlist_data".to_string(),
            history_key: "@playlist_history".to_string(),
        }
    }
}

impl ConfigSection for StorageConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::not_empty(&self.playlist_key, "storage.playlist_key"),
            Validator::not_empty(&self.history_key, "storage.history_key"),
            Validator::distinct(&self.playlist_key, &self.history_key, "storage.history_key"),
        ];

        if self.backend == StorageBackend::File {
            results.push(Validator::plain_file_name(
                &self.file_name,
                "storage.file_name",
            ));
        }

        Validator::collect_errors(results)
    }

    fn section_name(&self) -> &'static str {
        "storage"
    }
}
