use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{SignatureError, metrics::LapSelection, session::SessionType};

const APP_DIR_NAME: &str = "driver-signature";
const CONFIG_FILE_NAME: &str = "config.json";
const SESSIONS_DIR_NAME: &str = "sessions";
const DEFAULT_SEASON: u16 = 2023;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the session cache
    pub data_dir: PathBuf,
    pub default_season: u16,
    pub default_session_type: SessionType,
    pub lap_selection: LapSelection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("data"))
                .join(APP_DIR_NAME)
                .join(SESSIONS_DIR_NAME),
            default_season: DEFAULT_SEASON,
            default_session_type: SessionType::Practice2,
            lap_selection: LapSelection::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Reads the config from the user's config directory, if one was saved
    pub fn from_local_file() -> Option<Self> {
        Self::from_file(&Self::config_path()?)
    }

    pub fn from_file(config_path: &Path) -> Option<Self> {
        if !config_path.exists() {
            return None;
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| warn!("Could not open config file {:?}: {}", config_path, e))
            .ok()?;
        serde_json::from_reader(file)
            .map_err(|e| warn!("Could not parse config file {:?}: {}", config_path, e))
            .ok()
    }

    pub fn save(&self) -> Result<(), SignatureError> {
        let config_path = Self::config_path().ok_or(SignatureError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), SignatureError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| SignatureError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| SignatureError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| SignatureError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            data_dir: temp_dir.path().join("sessions"),
            default_season: 2021,
            default_session_type: SessionType::Race,
            lap_selection: LapSelection::FastestLap,
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::from_file(&path), Some(config));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"default_season": 2019}}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.default_season, 2019);
        assert_eq!(config.lap_selection, LapSelection::AllLaps);
        assert_eq!(config.data_dir, AppConfig::default().data_dir);
    }

    #[test]
    fn test_unreadable_config_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::from_file(&path), None);
        assert_eq!(AppConfig::from_file(&temp_dir.path().join("missing.json")), None);
    }
}
