use super::SettingsSource;
use crate::constants::CONFIG_FILE_NAME;
use crate::error::AppError;
use crate::models::{ActivitySettings, AppConfig, LoggingSettings};
use crate::validation;
use directories::ProjectDirs;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// File-backed configuration.
///
/// Loading never fails: a missing file is created with defaults, and a file
/// that cannot be read or parsed is reported and replaced by defaults in
/// memory (the file itself is left alone until the next save).
pub struct ConfigStore {
    path: PathBuf,
    config: RwLock<AppConfig>,
}

impl ConfigStore {
    pub fn default_path() -> Result<PathBuf, AppError> {
        let proj_dirs =
            ProjectDirs::from("com", "antiidle", "AntiIdle").ok_or(AppError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn open_default() -> Result<Self, AppError> {
        Ok(Self::open(Self::default_path()?))
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = load(&path);
        Self {
            path,
            config: RwLock::new(config),
        }
    }

    /// Log level from the file at `path`, read without logging or creating
    /// anything. Used before logging is set up.
    pub fn peek_log_level(path: &Path) -> Option<String> {
        read_config(path)
            .ok()
            .map(|config| config.logging.log_level)
            .filter(|level| validation::validate_log_level(level).is_ok())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate and persist `new_config`, then make it current.
    pub fn update(&self, new_config: AppConfig) -> Result<(), AppError> {
        validation::validate_activity_settings(&new_config.activity)?;
        validation::validate_log_level(&new_config.logging.log_level)?;

        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        write_config(&self.path, &new_config)?;
        *guard = new_config;
        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Write the current configuration back to disk.
    pub fn save(&self) -> Result<(), AppError> {
        let guard = self.config.read().unwrap_or_else(PoisonError::into_inner);
        write_config(&self.path, &guard)
    }

    /// Re-read the file, returning the configuration now in effect.
    pub fn reload(&self) -> AppConfig {
        let config = load(&self.path);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config.clone();
        config
    }
}

impl SettingsSource for ConfigStore {
    fn current_settings(&self) -> ActivitySettings {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .activity
            .clone()
    }
}

fn load(path: &Path) -> AppConfig {
    if !path.exists() {
        info!(
            "Configuration file {} not found, creating default configuration",
            path.display()
        );
        let config = AppConfig::default();
        if let Err(e) = write_config(path, &config) {
            error!("Failed to write default configuration: {e}");
        }
        return config;
    }

    info!("Loading configuration from {}", path.display());
    match read_config(path) {
        Ok(config) => sanitize(config),
        Err(e) => {
            error!("Failed to load configuration, using defaults: {e}");
            AppConfig::default()
        }
    }
}

fn sanitize(config: AppConfig) -> AppConfig {
    let logging = if validation::validate_log_level(&config.logging.log_level).is_ok() {
        config.logging
    } else {
        warn!("Empty log_level in configuration, using default");
        LoggingSettings::default()
    };

    AppConfig {
        activity: config.activity.sanitized(),
        logging,
    }
}

fn read_config(path: &Path) -> Result<AppConfig, AppError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimulationKey;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let store = ConfigStore::open(&path);

        assert!(path.exists());
        assert_eq!(store.config(), AppConfig::default());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);

        let mut config = store.config();
        config.activity.interval_seconds = 45;
        config.activity.simulation_key = SimulationKey::F13;
        store.update(config.clone()).unwrap();

        assert_eq!(store.current_settings().interval_seconds, 45);

        let reopened = ConfigStore::open(&path);
        assert_eq!(reopened.config(), config);
    }

    #[test]
    fn test_update_rejects_invalid_settings() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("config.json"));

        let mut config = store.config();
        config.activity.interval_seconds = 0;

        let err = store.update(config).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidInput {
                field: "interval_seconds",
                ..
            }
        ));
        assert_eq!(store.current_settings().interval_seconds, 30);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::open(&path);

        assert_eq!(store.config(), AppConfig::default());
        // The broken file is not overwritten on load
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_out_of_range_values_are_sanitized_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"activity": {"interval_seconds": 0, "simulation_key": "bogus", "mouse_movement_distance": 3}}"#,
        )
        .unwrap();

        let settings = ConfigStore::open(&path).current_settings();

        assert_eq!(settings.interval_seconds, 30);
        assert_eq!(settings.simulation_key, SimulationKey::Shift);
        assert_eq!(settings.mouse_movement_distance, 3);
    }

    #[test]
    fn test_peek_log_level_has_no_side_effects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert_eq!(ConfigStore::peek_log_level(&path), None);
        assert!(!path.exists());

        fs::write(&path, r#"{"logging": {"log_level": "debug"}}"#).unwrap();
        assert_eq!(ConfigStore::peek_log_level(&path).as_deref(), Some("debug"));
    }

    #[test]
    fn test_save_restores_a_deleted_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);
        fs::remove_file(&path).unwrap();

        store.save().unwrap();

        assert_eq!(ConfigStore::open(&path).config(), store.config());
    }

    #[test]
    fn test_default_path_ends_with_file_name() {
        if let Ok(path) = ConfigStore::default_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_reload_picks_up_external_edits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);

        fs::write(&path, r#"{"activity": {"interval_seconds": 7}}"#).unwrap();
        assert_eq!(store.current_settings().interval_seconds, 30);

        let reloaded = store.reload();
        assert_eq!(reloaded.activity.interval_seconds, 7);
        assert_eq!(store.current_settings().interval_seconds, 7);
    }
}
