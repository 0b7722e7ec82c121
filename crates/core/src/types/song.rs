//! Song domain model

use crate::error::{AppError, Result};
use crate::types::{Timestamp, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum song name length accepted by the add-song form
pub const MAX_SONG_NAME_LEN: usize = 50;

/// Maximum artist length accepted by the add-song form
pub const MAX_ARTIST_LEN: usize = 30;

/// Unique identifier for a song
///
/// New ids are random UUIDs. Ids restored from storage are kept verbatim,
/// whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    /// Creates a new random SongId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the SongId as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SongId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub artist: String,
    pub added_at: Timestamp,
}

impl Song {
    /// Creates a new song with a fresh id, stamped with the current time
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: SongId::new(),
            name: name.into(),
            artist: artist.into(),
            added_at: Timestamp::now(),
        }
    }

    /// Rebuilds a song from stored parts
    pub fn from_parts(
        id: SongId,
        name: impl Into<String>,
        artist: impl Into<String>,
        added_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            artist: artist.into(),
            added_at,
        }
    }
}

/// User input for a song that has not been added yet
///
/// Both fields are trimmed on construction. The reducer accepts any
/// strings; callers at the input boundary validate drafts first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub name: String,
    pub artist: String,
}

impl SongDraft {
    pub fn new(name: &str, artist: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            artist: artist.trim().to_string(),
        }
    }

    /// Validates the draft, naming every invalid field in the error
    pub fn check(&self) -> Result<()> {
        let problems: Vec<(&str, String)> = self.field_errors().collect();
        if problems.is_empty() {
            return Ok(());
        }

        let fields: Vec<&str> = problems.iter().map(|(field, _)| *field).collect();
        let reasons: Vec<&str> = problems.iter().map(|(_, reason)| reason.as_str()).collect();
        Err(AppError::invalid_input(fields.join(", "), reasons.join("; ")))
    }

    fn field_errors(&self) -> impl Iterator<Item = (&'static str, String)> {
        let name = check_field(&self.name, "Song name", MAX_SONG_NAME_LEN).map(|e| ("name", e));
        let artist = check_field(&self.artist, "Artist", MAX_ARTIST_LEN).map(|e| ("artist", e));
        name.into_iter().chain(artist)
    }
}

fn check_field(value: &str, label: &str, max_len: usize) -> Option<String> {
    if value.is_empty() {
        Some(format!("{} cannot be empty", label))
    } else if value.chars().count() > max_len {
        Some(format!(
            "{} cannot be longer than {} characters",
            label, max_len
        ))
    } else {
        None
    }
}

impl Validator for SongDraft {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let errors: Vec<String> = self.field_errors().map(|(_, reason)| reason).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
