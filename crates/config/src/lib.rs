//! Setlist Configuration System
//!
//! Config sections implement the `ConfigSection` trait and are collected in
//! [`Config`], stored as TOML in the platform config directory.
//!
//! # Architecture
//!
//! - **Trait-based**: each section validates itself
//! - **Graceful degradation**: invalid configs fall back to defaults with warnings
//! - **Atomic writes**: config files are never left in a corrupted state
//! - **Overrides**: `SETLIST_SECTION_FIELD` environment variables win over the file
//!
//! # Example
//!
//! ```rust
//! use setlist_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Save mode: {}", config.session.save_mode);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod session_config;
mod storage_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{
    apply_env_overrides, ConfigManager, ENV_DATA_DIR, ENV_LOG_LEVEL, ENV_SAVE_MODE,
    ENV_STORAGE_BACKEND, ENV_STORAGE_FILE_NAME,
};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use session_config::{SaveMode, SessionConfig};
pub use storage_config::{StorageBackend, StorageConfig};

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Playlist storage backend and keys
    pub storage: StorageConfig,

    /// Save scheduling
    pub session: SessionConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.storage.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.session.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            storage: StorageConfig::default(),
            session: SessionConfig::default(),
        }
    }
}
