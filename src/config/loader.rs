use crate::config::Config;
use crate::error::{ManifestVerifyError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "MANIFEST_VERIFY_CONFIG";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "manifest-verify")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load config from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write config to `path`, creating parent directories
    pub fn save_to(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write a default config file; refuses to overwrite an existing one
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ManifestVerifyError::Config(format!(
                "Config file already exists at {}",
                path.display()
            )));
        }

        Self::save_to(&Config::default(), path)
    }
}
