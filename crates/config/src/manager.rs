//! Configuration manager - main API for config operations

use crate::persistence::{join_errors, ConfigPersistence};
use crate::{Config, ConfigError, ConfigResult, StorageBackend};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables consulted by [`ConfigManager::load_with_env_overrides`]
pub const ENV_LOG_LEVEL: &str = "SETLIST_APP_LOG_LEVEL";
pub const ENV_DATA_DIR: &str = "SETLIST_APP_DATA_DIR";
pub const ENV_STORAGE_BACKEND: &str = "SETLIST_STORAGE_BACKEND";
pub const ENV_STORAGE_FILE_NAME: &str = "SETLIST_STORAGE_FILE_NAME";
pub const ENV_SAVE_MODE: &str = "SETLIST_SESSION_SAVE_MODE";

/// Main configuration manager
///
/// Loads, saves and resolves paths for the configuration file.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/setlist/`
    /// - macOS: `~/Library/Application Support/setlist/`
    /// - Windows: `%APPDATA%\setlist\config\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = Self::project_dirs()?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join(CONFIG_FILE_NAME));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("", "", "setlist").ok_or_else(|| ConfigError::PathResolutionError {
            reason: "Could not determine user home directory".to_string(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Resolves the directory holding the playlist store
    ///
    /// `app.data_dir` wins when set; otherwise the platform data directory.
    pub fn data_dir(&self, config: &Config) -> ConfigResult<PathBuf> {
        match &config.app.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Resolves the store file path, `None` for the memory backend
    pub fn store_path(&self, config: &Config) -> ConfigResult<Option<PathBuf>> {
        match config.storage.backend {
            StorageBackend::File => Ok(Some(self.data_dir(config)?.join(&config.storage.file_name))),
            StorageBackend::Memory => Ok(None),
        }
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted or invalid, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    ///
    /// Validates first and writes atomically.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Updates the configuration using a closure
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use setlist_config::{ConfigManager, SaveMode};
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.session.save_mode = SaveMode::Serialized;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        log::info!("Generated default config at {}", self.config_path().display());
        Ok(true)
    }

    /// Overwrites the existing config file with default values
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config file and applies `SETLIST_SECTION_FIELD` overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }
}

/// Applies overrides read through `lookup`
///
/// Unknown enum values and overrides that leave the config invalid are
/// errors; the config is left partially updated in that case.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.app.log_level = parse_override(ENV_LOG_LEVEL, &value)?;
    }

    if let Some(value) = lookup(ENV_DATA_DIR) {
        config.app.data_dir = Some(PathBuf::from(value));
    }

    if let Some(value) = lookup(ENV_STORAGE_BACKEND) {
        config.storage.backend = parse_override(ENV_STORAGE_BACKEND, &value)?;
    }

    if let Some(value) = lookup(ENV_STORAGE_FILE_NAME) {
        config.storage.file_name = value;
    }

    if let Some(value) = lookup(ENV_SAVE_MODE) {
        config.session.save_mode = parse_override(ENV_SAVE_MODE, &value)?;
    }

    config
        .validate()
        .map_err(|errors| ConfigError::ValidationError(join_errors(&errors)))
}

fn parse_override<T>(variable: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr<Err = String>,
{
    let parsed = value.parse::<T>().map_err(|reason| ConfigError::InvalidOverride {
        variable: variable.to_string(),
        value: value.to_string(),
        reason,
    })?;
    log::debug!("{} overrides config with '{}'", variable, value);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogLevel, SaveMode};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| {
                config.session.save_mode = SaveMode::Serialized;
            })
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.session.save_mode, SaveMode::Serialized);
    }

    #[test]
    fn test_initialize_creates_file_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().expect("Should initialize"));
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        manager.save(&config).expect("Should save");

        manager.reset().expect("Should reset");
        assert_eq!(manager.load().expect("Should load"), Config::default());
    }

    #[test]
    fn test_store_path_uses_configured_data_dir() {
        let (temp_dir, manager) = setup_test_manager();
        let mut config = Config::default();
        config.app.data_dir = Some(temp_dir.path().join("data"));

        let path = manager.store_path(&config).expect("Should resolve");
        assert_eq!(path, Some(temp_dir.path().join("data").join("playlist.json")));

        config.storage.backend = StorageBackend::Memory;
        assert_eq!(manager.store_path(&config).expect("Should resolve"), None);
    }

    #[test]
    fn test_config_file_path() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.config_path().ends_with("config.toml"));
        assert!(manager.config_path().starts_with(manager.config_dir()));
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_LOG_LEVEL, "debug"),
                (ENV_DATA_DIR, "/tmp/setlist"),
                (ENV_STORAGE_BACKEND, "memory"),
                (ENV_SAVE_MODE, "serialized"),
            ]),
        )
        .expect("Should apply overrides");

        assert_eq!(config.app.log_level, LogLevel::Debug);
        assert_eq!(config.app.data_dir, Some(PathBuf::from("/tmp/setlist")));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.session.save_mode, SaveMode::Serialized);
    }

    #[test]
    fn test_env_override_bad_value() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_SAVE_MODE, "whenever")]))
            .expect_err("Should reject unknown save mode");
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }

    #[test]
    fn test_env_override_rejects_unsafe_file_name() {
        for name in ["../../x.json", "", "data/playlist.json"] {
            let mut config = Config::default();
            let err = apply_env_overrides(&mut config, env(&[(ENV_STORAGE_FILE_NAME, name)]))
                .expect_err("Should reject file name");
            assert!(
                matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("file_name")),
                "unexpected error for {:?}: {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_env_override_plain_file_name_accepted() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[(ENV_STORAGE_FILE_NAME, "songs.json")]))
            .expect("Should accept plain file name");
        assert_eq!(config.storage.file_name, "songs.json");
    }

    #[test]
    fn test_no_env_overrides_is_identity() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[])).expect("Should apply");
        assert_eq!(config, Config::default());
    }
}
