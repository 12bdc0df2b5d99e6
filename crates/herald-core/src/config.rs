use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foreground::DEFAULT_FALLBACK_WINDOW;

/// Get the local data directory for herald.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("herald");
    Ok(path)
}

/// Settings read from `config.toml` in the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    /// How long the last user app survives a system UI interruption
    pub fallback_window_ms: u64,
    /// Database location; `<data_dir>/herald.db` when unset
    pub database_path: Option<PathBuf>,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            fallback_window_ms: u64::try_from(DEFAULT_FALLBACK_WINDOW.as_millis())
                .unwrap_or(15_000),
            database_path: None,
        }
    }
}

impl HeraldConfig {
    /// Load from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unknown or the file is malformed
    pub fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?.join("config.toml"))
    }

    /// Load from a file; a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to a file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    #[must_use]
    pub fn fallback_window(&self) -> Duration {
        Duration::from_millis(self.fallback_window_ms)
    }
}
