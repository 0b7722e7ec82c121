//! Setlist Storage Layer
//!
//! Persists the playlist history to a key-value store.
//!
//! - [`KeyValueStore`] is the store contract: string keys, UTF-8 JSON values
//! - [`MemoryStore`] and [`FileStore`] are the bundled backends
//! - [`PlaylistPersistence`] maps a `PlaylistState` to two stored records
//!   and back
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use setlist_core::{PlaylistAction, PlaylistState};
//! use setlist_storage::{MemoryStore, PlaylistPersistence};
//!
//! let persistence = PlaylistPersistence::new(Arc::new(MemoryStore::new()));
//!
//! let mut state = PlaylistState::new();
//! state.apply(PlaylistAction::add_song("Lose Yourself", "Eminem"));
//! persistence.save(&state).expect("memory store accepts writes");
//!
//! assert_eq!(persistence.load(), state);
//! ```

mod file_store;
mod persistence;
pub mod records;
mod store;

pub use file_store::FileStore;
pub use persistence::{
    PersistenceKeys, PlaylistPersistence, HISTORY_STORAGE_KEY, PLAYLIST_STORAGE_KEY,
};
pub use records::{HistoryRecord, PlaylistRecord, SnapshotRecord, SongRecord};
pub use store::{KeyValueStore, MemoryStore};
