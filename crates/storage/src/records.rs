//! Persisted record shapes
//!
//! ```text
//! PlaylistRecord = { songs: [SongRecord], historyIndex: int }
//! HistoryRecord  = [ { songs: [SongRecord], historyIndex: int } ]
//! SongRecord     = { id, name, artist, addedAt: ISO-8601 string }
//! ```
//!
//! History entries keep a `historyIndex` field for format compatibility;
//! it is always written as `-1` and ignored on read.

use serde::{Deserialize, Serialize};
use setlist_core::{Result, Snapshot, Song, SongId, Timestamp};

/// Placeholder cursor written into every history entry
pub const SNAPSHOT_HISTORY_INDEX: i64 = -1;

/// Stored form of a [`Song`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub added_at: String,
}

impl SongRecord {
    pub fn from_song(song: &Song) -> Result<Self> {
        Ok(Self {
            id: song.id.as_str().to_string(),
            name: song.name.clone(),
            artist: song.artist.clone(),
            added_at: song.added_at.to_iso8601()?,
        })
    }

    pub fn into_song(self) -> Result<Song> {
        let added_at = Timestamp::parse_iso8601(&self.added_at)?;
        Ok(Song::from_parts(
            SongId::from_string(self.id),
            self.name,
            self.artist,
            added_at,
        ))
    }
}

/// Current song list plus cursor, stored under the playlist key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRecord {
    pub songs: Vec<SongRecord>,
    pub history_index: i64,
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub songs: Vec<SongRecord>,
    #[serde(default = "snapshot_history_index")]
    pub history_index: i64,
}

fn snapshot_history_index() -> i64 {
    SNAPSHOT_HISTORY_INDEX
}

impl SnapshotRecord {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        Ok(Self {
            songs: encode_songs(&snapshot.songs)?,
            history_index: SNAPSHOT_HISTORY_INDEX,
        })
    }

    pub fn into_snapshot(self) -> Result<Snapshot> {
        Ok(Snapshot::new(decode_songs(self.songs)?))
    }
}

/// The whole history, stored under the history key
pub type HistoryRecord = Vec<SnapshotRecord>;

pub(crate) fn encode_songs(songs: &[Song]) -> Result<Vec<SongRecord>> {
    songs.iter().map(SongRecord::from_song).collect()
}

pub(crate) fn decode_songs(records: Vec<SongRecord>) -> Result<Vec<Song>> {
    records.into_iter().map(SongRecord::into_song).collect()
}
