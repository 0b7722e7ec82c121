pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    reduce, PlaylistAction, PlaylistState, Snapshot, Song, SongDraft, SongId, Timestamp,
    Validator, MAX_ARTIST_LEN, MAX_SONG_NAME_LEN,
};
