use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;

/// Application configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Level pack to play. The built-in pack is used when unset.
    pub levels_path: Option<PathBuf>,
    pub stats_path: PathBuf,
    pub start_level: usize,
    pub demo_only: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            levels_path: None,
            stats_path: PathBuf::from("watersort_stats.json"),
            start_level: 0,
            demo_only: false,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log_filter must not be empty".to_string(),
            ));
        }
        if self.stats_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "stats_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
