//! The running playlist session

use crate::writer::SaveWriter;
use setlist_config::{SaveMode, SessionConfig, StorageConfig};
use setlist_core::{AppError, PlaylistAction, PlaylistState, Result, SongDraft, SongId};
use setlist_storage::{KeyValueStore, PersistenceKeys, PlaylistPersistence};
use std::sync::Arc;
use tokio::runtime::Handle;

/// What [`PlaylistSession::load`] found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved playlist replaced the in-memory state
    Restored,
    /// Nothing saved yet; the in-memory state was kept
    NotFound,
    /// The saved playlist was unreadable; the in-memory state was kept
    Failed(String),
}

/// Owns the playlist state and keeps storage in step with it
///
/// Mutations are applied synchronously. Once [`load`](Self::load) has run,
/// each change schedules a background save.
pub struct PlaylistSession {
    state: PlaylistState,
    persistence: PlaylistPersistence,
    saves: SaveWriter,
    loaded: bool,
}

impl PlaylistSession {
    /// Creates a session on the current tokio runtime
    pub fn new(persistence: PlaylistPersistence, mode: SaveMode) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| AppError::InternalError {
            message: format!("playlist session needs a tokio runtime: {}", e),
        })?;

        Ok(Self {
            state: PlaylistState::new(),
            saves: SaveWriter::spawn(mode, persistence.clone(), runtime),
            persistence,
            loaded: false,
        })
    }

    /// Creates a session from the storage and session config sections
    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        storage: &StorageConfig,
        session: &SessionConfig,
    ) -> Result<Self> {
        let keys = PersistenceKeys::new(&storage.playlist_key, &storage.history_key);
        Self::new(PlaylistPersistence::with_keys(store, keys), session.save_mode)
    }

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    /// Whether `load` has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn save_mode(&self) -> SaveMode {
        self.saves.mode()
    }

    pub fn persistence(&self) -> &PlaylistPersistence {
        &self.persistence
    }

    /// Reads the saved playlist and enables saving
    ///
    /// A restored playlist replaces whatever was dispatched before; absent or
    /// unreadable records keep it.
    pub async fn load(&mut self) -> LoadOutcome {
        let persistence = self.persistence.clone();
        let result = match tokio::task::spawn_blocking(move || persistence.try_load()).await {
            Ok(result) => result,
            Err(e) => Err(AppError::InternalError {
                message: format!("load task did not complete: {}", e),
            }),
        };

        let outcome = match result {
            Ok(Some(state)) => {
                log::info!(
                    "Restored playlist with {} songs ({} history entries)",
                    state.len(),
                    state.history().len()
                );
                self.state.apply(PlaylistAction::LoadState(state));
                LoadOutcome::Restored
            }
            Ok(None) => {
                log::info!("No saved playlist found");
                LoadOutcome::NotFound
            }
            Err(e) => {
                log::warn!("Failed to load playlist: {}, keeping current state", e);
                LoadOutcome::Failed(e.to_string())
            }
        };

        self.loaded = true;
        outcome
    }

    /// Applies an action and schedules a save when the state changed
    pub fn dispatch(&mut self, action: PlaylistAction) {
        let changes = match &action {
            PlaylistAction::Undo => self.state.can_undo(),
            PlaylistAction::Redo => self.state.can_redo(),
            PlaylistAction::LoadState(state) => *state != self.state,
            other => other.is_mutation(),
        };
        let kind = action.kind();

        self.state.apply(action);
        log::debug!(
            "Dispatched {}: {} songs, history index {}",
            kind,
            self.state.len(),
            self.state.history_position()
        );

        if !changes {
            return;
        }

        if self.loaded {
            self.saves.schedule(self.state.clone());
        } else {
            log::debug!("Playlist not loaded yet, skipping save after {}", kind);
        }
    }

    /// Validates a draft and appends it
    ///
    /// Returns the id of the new song.
    pub fn add_song(&mut self, draft: SongDraft) -> Result<SongId> {
        draft.check()?;

        self.dispatch(PlaylistAction::add_song(draft.name, draft.artist));
        self.state
            .songs()
            .last()
            .map(|song| song.id.clone())
            .ok_or_else(|| AppError::InternalError {
                message: "added song missing from playlist".to_string(),
            })
    }

    pub fn remove_song(&mut self, id: impl Into<SongId>) {
        self.dispatch(PlaylistAction::remove_song(id));
    }

    pub fn clear_playlist(&mut self) {
        self.dispatch(PlaylistAction::ClearPlaylist);
    }

    pub fn undo(&mut self) {
        self.dispatch(PlaylistAction::Undo);
    }

    pub fn redo(&mut self) {
        self.dispatch(PlaylistAction::Redo);
    }

    /// Waits for every scheduled save to finish
    pub async fn flush(&mut self) {
        self.saves.flush().await;
    }

    /// Removes the saved playlist from storage
    ///
    /// Pending saves are flushed first so none of them lands afterwards. The
    /// in-memory state is untouched.
    pub async fn clear_persisted(&mut self) -> Result<()> {
        self.flush().await;

        let persistence = self.persistence.clone();
        tokio::task::spawn_blocking(move || persistence.clear())
            .await
            .map_err(|e| AppError::InternalError {
                message: format!("clear task did not complete: {}", e),
            })?
    }
}

impl std::fmt::Debug for PlaylistSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistSession")
            .field("songs", &self.state.len())
            .field("history_index", &self.state.history_position())
            .field("loaded", &self.loaded)
            .field("save_mode", &self.saves.mode())
            .finish()
    }
}
