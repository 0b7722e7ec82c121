//! Session configuration section

use crate::validation::{ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the session schedules saves after each dispatch
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Every save is an independent background task; the last to finish wins
    #[default]
    FireAndForget,
    /// One background writer; pending states are coalesced to the newest
    Serialized,
}

impl std::fmt::Display for SaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveMode::FireAndForget => write!(f, "fire_and_forget"),
            SaveMode::Serialized => write!(f, "serialized"),
        }
    }
}

impl FromStr for SaveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fire_and_forget" => Ok(SaveMode::FireAndForget),
            "serialized" => Ok(SaveMode::Serialized),
            other => Err(format!("unknown save mode '{}'", other)),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub save_mode: SaveMode,
}

impl ConfigSection for SessionConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }

    fn section_name(&self) -> &'static str {
        "session"
    }
}
