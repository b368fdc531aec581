use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_CUTOFF_HZ;

/// Persisted viewer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the fixed-name `.dat` files.
    pub data_dir: PathBuf,
    /// Low-pass cutoff frequency (Hz).
    pub cutoff_hz: f64,
    /// Last spectrum opened through File → Open spectrum…
    pub last_custom_spectrum: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            last_custom_spectrum: None,
        }
    }
}

impl AppConfig {
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "FourierLab").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`; a missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Could not save config to {}: {e:#}", path.display());
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            data_dir: PathBuf::from("/data/td"),
            cutoff_hz: 80.0,
            last_custom_spectrum: Some(PathBuf::from("/data/td/spectre_x.dat")),
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn partial_and_broken_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{"cutoff_hz": 42.0}"#).unwrap();
        let partial = AppConfig::load_from(&path);
        assert_eq!(partial.cutoff_hz, 42.0);
        assert_eq!(partial.data_dir, PathBuf::from("."));

        fs::write(&path, "not json").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        assert_eq!(AppConfig::load_from(&dir.path().join("absent.json")), AppConfig::default());
    }
}
