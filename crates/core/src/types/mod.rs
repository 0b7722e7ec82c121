//! Domain types for Setlist
//!
//! - `song`: songs, song ids, and add-song input validation
//! - `playlist`: the undoable playlist state and its reducer
//! - `common`: shared traits and utilities

mod common;
mod playlist;
mod song;

// Re-export all public types
pub use common::{Timestamp, Validator};
pub use playlist::{reduce, PlaylistAction, PlaylistState, Snapshot};
pub use song::{Song, SongDraft, SongId, MAX_ARTIST_LEN, MAX_SONG_NAME_LEN};
