use crate::domain::{config::SermonConfig, error::{SermonError, SermonResult}};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Manager for the per-user file `~/.config/sermon/config.toml`.
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Load configuration, using built-in defaults when the user file does
    /// not exist.
    pub fn load_config(&self) -> SermonResult<SermonConfig> {
        match &self.config_path {
            Some(path) if path.exists() => self.load_config_from_path(path),
            _ => Ok(SermonConfig::default()),
        }
    }

    /// Load configuration from an explicit path. A missing file is an error.
    pub fn load_config_from_path(&self, path: &Path) -> SermonResult<SermonConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            SermonError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SermonError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Write `config` to `path`, creating parent directories.
    pub fn save_config_to_path(&self, path: &Path, config: &SermonConfig) -> SermonResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SermonError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| SermonError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            SermonError::config(format!("Failed to write config file {}: {}", path.display(), e))
        })
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("sermon").join("config.toml"))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
