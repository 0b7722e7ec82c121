//! Playlist persistence adapter
//!
//! Saves a `PlaylistState` as two independent entries:
//! - the playlist key holds `{songs, historyIndex}`
//! - the history key holds the snapshot list
//!
//! Loading needs both entries. Missing entries mean "nothing saved yet";
//! malformed ones are logged and replaced by the empty playlist. Write
//! failures are never retried.

use crate::records::{decode_songs, encode_songs, HistoryRecord, PlaylistRecord, SnapshotRecord};
use crate::store::KeyValueStore;
use setlist_core::{AppError, PlaylistState, Result, Snapshot};
use std::sync::Arc;

/// Default key for the current song list and cursor
pub const PLAYLIST_STORAGE_KEY: &str = "@playlist_data";

/// Default key for the history snapshots
pub const HISTORY_STORAGE_KEY: &str = "@playlist_history";

/// The two keys a playlist is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceKeys {
    pub playlist: String,
    pub history: String,
}

impl PersistenceKeys {
    pub fn new(playlist: impl Into<String>, history: impl Into<String>) -> Self {
        Self {
            playlist: playlist.into(),
            history: history.into(),
        }
    }
}

impl Default for PersistenceKeys {
    fn default() -> Self {
        Self::new(PLAYLIST_STORAGE_KEY, HISTORY_STORAGE_KEY)
    }
}

/// Serializes playlist state to and from a [`KeyValueStore`]
#[derive(Clone)]
pub struct PlaylistPersistence {
    store: Arc<dyn KeyValueStore>,
    keys: PersistenceKeys,
}

impl PlaylistPersistence {
    /// Creates an adapter using the default keys
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(store, PersistenceKeys::default())
    }

    /// Creates an adapter using custom keys
    pub fn with_keys(store: Arc<dyn KeyValueStore>, keys: PersistenceKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &PersistenceKeys {
        &self.keys
    }

    /// Encodes a state into `(playlist_json, history_json)`
    ///
    /// Identical states always encode to identical strings.
    pub fn encode(&self, state: &PlaylistState) -> Result<(String, String)> {
        let playlist = PlaylistRecord {
            songs: encode_songs(state.songs())?,
            history_index: state.history_position(),
        };
        let history = state
            .history()
            .iter()
            .map(SnapshotRecord::from_snapshot)
            .collect::<Result<HistoryRecord>>()?;

        let playlist_json = serde_json::to_string(&playlist)
            .map_err(|e| AppError::serialization("Failed to encode playlist record", e))?;
        let history_json = serde_json::to_string(&history)
            .map_err(|e| AppError::serialization("Failed to encode history record", e))?;

        Ok((playlist_json, history_json))
    }

    /// Decodes both stored entries back into a state
    pub fn decode(&self, playlist_json: &str, history_json: &str) -> Result<PlaylistState> {
        let playlist: PlaylistRecord =
            serde_json::from_str(playlist_json).map_err(|e| AppError::CorruptedRecord {
                key: self.keys.playlist.clone(),
                reason: e.to_string(),
            })?;
        let history: HistoryRecord =
            serde_json::from_str(history_json).map_err(|e| AppError::CorruptedRecord {
                key: self.keys.history.clone(),
                reason: e.to_string(),
            })?;

        let history_index = match playlist.history_index {
            -1 => None,
            index if index >= 0 => Some(index as usize),
            index => {
                return Err(AppError::InvalidHistoryIndex {
                    index,
                    history_len: history.len(),
                })
            }
        };

        let songs = decode_songs(playlist.songs)?;
        let history = history
            .into_iter()
            .map(SnapshotRecord::into_snapshot)
            .collect::<Result<Vec<Snapshot>>>()?;

        PlaylistState::from_parts(songs, history, history_index)
    }

    /// Writes both entries in one `multi_set`
    pub fn save(&self, state: &PlaylistState) -> Result<()> {
        let (playlist_json, history_json) = self.encode(state)?;
        self.store.multi_set(&[
            (self.keys.playlist.as_str(), playlist_json.as_str()),
            (self.keys.history.as_str(), history_json.as_str()),
        ])?;

        log::debug!(
            "Saved playlist: {} songs, {} history entries, index {}",
            state.len(),
            state.history().len(),
            state.history_position()
        );
        Ok(())
    }

    /// Saves, logging and discarding any failure
    ///
    /// A failed save leaves the previous entries in place, so the next cold
    /// start will not see this mutation.
    pub fn save_or_log(&self, state: &PlaylistState) {
        if let Err(e) = self.save(state) {
            log::error!("Error saving playlist to storage: {}", e);
        }
    }

    /// Reads both entries
    ///
    /// Returns `Ok(None)` when either entry is absent.
    pub fn try_load(&self) -> Result<Option<PlaylistState>> {
        let values = self
            .store
            .multi_get(&[self.keys.playlist.as_str(), self.keys.history.as_str()])?;

        let mut values = values.into_iter().map(|(_, value)| value);
        let playlist_json = values.next().flatten();
        let history_json = values.next().flatten();

        match (playlist_json, history_json) {
            (Some(playlist_json), Some(history_json)) => {
                self.decode(&playlist_json, &history_json).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Reads both entries, falling back to the empty playlist
    ///
    /// Absent entries fall back silently; unreadable ones are logged. No
    /// partial recovery is attempted.
    pub fn load(&self) -> PlaylistState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                log::info!("No saved playlist found, starting empty");
                PlaylistState::default()
            }
            Err(e) => {
                log::warn!("Failed to load playlist: {}, using defaults", e);
                PlaylistState::default()
            }
        }
    }

    /// Removes both entries from the store
    pub fn clear(&self) -> Result<()> {
        self.store
            .multi_remove(&[self.keys.playlist.as_str(), self.keys.history.as_str()])?;
        log::info!(
            "Removed saved playlist ('{}', '{}')",
            self.keys.playlist,
            self.keys.history
        );
        Ok(())
    }
}

impl std::fmt::Debug for PlaylistPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistPersistence")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use setlist_core::{PlaylistAction, Song, SongId, Timestamp};

    fn setup() -> (Arc<MemoryStore>, PlaylistPersistence) {
        let store = Arc::new(MemoryStore::new());
        let persistence = PlaylistPersistence::new(store.clone());
        (store, persistence)
    }

    fn song(id: &str, millis: i64) -> Song {
        Song::from_parts(SongId::from_string(id), id, "Artist", Timestamp::from_millis(millis))
    }

    #[test]
    fn test_default_keys() {
        let keys = PersistenceKeys::default();
        assert_eq!(keys.playlist, "@playlist_data");
        assert_eq!(keys.history, "@playlist_history");
    }

    #[test]
    fn test_empty_store_loads_none() {
        let (_store, persistence) = setup();
        assert!(persistence.try_load().unwrap().is_none());
        assert_eq!(persistence.load(), PlaylistState::default());
    }

    #[test]
    fn test_save_writes_both_keys() {
        let (store, persistence) = setup();
        persistence.save(&PlaylistState::new()).unwrap();

        assert_eq!(
            store.get(PLAYLIST_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"songs":[],"historyIndex":-1}"#)
        );
        assert_eq!(store.get(HISTORY_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_roundtrip() {
        let (_store, persistence) = setup();
        let mut state = PlaylistState::with_songs(vec![song("a", 1_000), song("b", 2_500)]);
        state.apply(PlaylistAction::remove_song("a"));
        state.apply(PlaylistAction::Undo);

        persistence.save(&state).unwrap();
        assert_eq!(persistence.try_load().unwrap(), Some(state));
    }

    #[test]
    fn test_only_one_key_present_loads_none() {
        let (store, persistence) = setup();
        store
            .set(PLAYLIST_STORAGE_KEY, r#"{"songs":[],"historyIndex":-1}"#)
            .unwrap();
        assert!(persistence.try_load().unwrap().is_none());
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let (store, persistence) = setup();
        store.set(PLAYLIST_STORAGE_KEY, "{oops").unwrap();
        store.set(HISTORY_STORAGE_KEY, "[]").unwrap();

        assert!(matches!(
            persistence.try_load(),
            Err(AppError::CorruptedRecord { ref key, .. }) if key == PLAYLIST_STORAGE_KEY
        ));
        assert_eq!(persistence.load(), PlaylistState::default());
    }

    #[test]
    fn test_index_out_of_range_is_rejected() {
        let (store, persistence) = setup();
        store
            .set(PLAYLIST_STORAGE_KEY, r#"{"songs":[],"historyIndex":2}"#)
            .unwrap();
        store
            .set(HISTORY_STORAGE_KEY, r#"[{"songs":[],"historyIndex":-1}]"#)
            .unwrap();

        assert!(matches!(
            persistence.try_load(),
            Err(AppError::InvalidHistoryIndex {
                index: 2,
                history_len: 1
            })
        ));
    }

    #[test]
    fn test_index_below_minus_one_is_rejected() {
        let (store, persistence) = setup();
        store
            .set(PLAYLIST_STORAGE_KEY, r#"{"songs":[],"historyIndex":-2}"#)
            .unwrap();
        store.set(HISTORY_STORAGE_KEY, "[]").unwrap();

        assert!(persistence.try_load().is_err());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let (store, persistence) = setup();
        store.set("unrelated", "1").unwrap();
        persistence.save(&PlaylistState::new()).unwrap();

        persistence.clear().unwrap();
        assert!(persistence.try_load().unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_custom_keys() {
        let store = Arc::new(MemoryStore::new());
        let persistence = PlaylistPersistence::with_keys(
            store.clone(),
            PersistenceKeys::new("p", "h"),
        );
        persistence.save(&PlaylistState::new()).unwrap();

        assert!(store.get("p").unwrap().is_some());
        assert!(store.get("h").unwrap().is_some());
        assert!(store.get(PLAYLIST_STORAGE_KEY).unwrap().is_none());
    }
}
