//! Playlist state with linear undo/redo history
//!
//! The history is a list of [`Snapshot`]s plus a cursor (`history_index`):
//! - entries at `0..=history_index` are the song lists as they were right
//!   before each mutation, i.e. undo targets
//! - entries after `history_index` are song lists that were undone away
//!   from, i.e. redo targets
//!
//! Undo and redo exchange the current song list with the target entry, so
//! undoing N steps and redoing N steps lands on the exact song list that
//! was current before the undos. A new mutation truncates every redo
//! target.

use crate::error::AppError;
use crate::types::{Song, SongId};
use serde::{Deserialize, Serialize};

/// A flat copy of a song list, recorded in the history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub songs: Vec<Song>,
}

impl Snapshot {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }
}

/// Actions accepted by [`PlaylistState::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistAction {
    /// Append a new song with a fresh id and the current timestamp
    AddSong { name: String, artist: String },
    /// Remove every song with the given id
    RemoveSong { id: SongId },
    /// Remove all songs
    ClearPlaylist,
    Undo,
    Redo,
    /// Replace the whole state, used when restoring from storage
    LoadState(PlaylistState),
}

impl PlaylistAction {
    pub fn add_song(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self::AddSong {
            name: name.into(),
            artist: artist.into(),
        }
    }

    pub fn remove_song(id: impl Into<SongId>) -> Self {
        Self::RemoveSong { id: id.into() }
    }

    /// Returns true for actions that record a history entry
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddSong { .. } | Self::RemoveSong { .. } | Self::ClearPlaylist
        )
    }

    /// Short name used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddSong { .. } => "add_song",
            Self::RemoveSong { .. } => "remove_song",
            Self::ClearPlaylist => "clear_playlist",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::LoadState(_) => "load_state",
        }
    }
}

/// The full undoable playlist state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistState {
    songs: Vec<Song>,
    history: Vec<Snapshot>,
    history_index: Option<usize>,
}

impl PlaylistState {
    /// Creates the empty initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with the given songs and no history
    pub fn with_songs(songs: Vec<Song>) -> Self {
        Self {
            songs,
            history: Vec::new(),
            history_index: None,
        }
    }

    /// Rebuilds a state from stored parts, checking the cursor range
    pub fn from_parts(
        songs: Vec<Song>,
        history: Vec<Snapshot>,
        history_index: Option<usize>,
    ) -> Result<Self, AppError> {
        let state = Self {
            songs,
            history,
            history_index,
        };
        state.validate()?;
        Ok(state)
    }

    /// Checks that `history_index` points inside `history`
    pub fn validate(&self) -> Result<(), AppError> {
        match self.history_index {
            Some(index) if index >= self.history.len() => Err(AppError::InvalidHistoryIndex {
                index: index as i64,
                history_len: self.history.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    /// Cursor as a signed position, `-1` when nothing can be undone
    pub fn history_position(&self) -> i64 {
        self.history_index.map_or(-1, |index| index as i64)
    }

    pub fn can_undo(&self) -> bool {
        self.history_index.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_slot() < self.history.len()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Finds a song in the current list
    pub fn find(&self, id: &SongId) -> Option<&Song> {
        self.songs.iter().find(|song| &song.id == id)
    }

    /// Applies an action in place
    pub fn apply(&mut self, action: PlaylistAction) {
        match action {
            PlaylistAction::AddSong { name, artist } => {
                self.record_history();
                self.songs.push(Song::new(name, artist));
            }
            PlaylistAction::RemoveSong { id } => {
                // Unknown ids still consume a history slot.
                self.record_history();
                self.songs.retain(|song| song.id != id);
            }
            PlaylistAction::ClearPlaylist => {
                self.record_history();
                self.songs.clear();
            }
            PlaylistAction::Undo => self.undo(),
            PlaylistAction::Redo => self.redo(),
            PlaylistAction::LoadState(state) => *self = state,
        }
    }

    /// Index the next history entry is written to, and the redo target
    fn next_slot(&self) -> usize {
        self.history_index.map_or(0, |index| index + 1)
    }

    fn record_history(&mut self) {
        let slot = self.next_slot();
        self.history.truncate(slot);
        self.history.push(Snapshot::new(self.songs.clone()));
        self.history_index = Some(slot);
    }

    fn undo(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if let Some(snapshot) = self.history.get_mut(index) {
            std::mem::swap(&mut self.songs, &mut snapshot.songs);
            self.history_index = index.checked_sub(1);
        }
    }

    fn redo(&mut self) {
        let slot = self.next_slot();
        if let Some(snapshot) = self.history.get_mut(slot) {
            std::mem::swap(&mut self.songs, &mut snapshot.songs);
            self.history_index = Some(slot);
        }
    }
}

/// Pure transition: returns the state produced by applying `action` to `state`
pub fn reduce(mut state: PlaylistState, action: PlaylistAction) -> PlaylistState {
    state.apply(action);
    state
}
