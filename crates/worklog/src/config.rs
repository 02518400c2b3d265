//! Configuration management for worklog.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (WORKLOG_REMOTE)
//! 2. Config file ($WORKLOG_CONFIG or <data dir>/config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use worklog_core::{SessionConfig, SummaryConfig, SyncConfig};

use crate::error::CliResult;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session lifecycle settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Git sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Summary generation settings
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for worklog data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Session store file name, relative to `data_dir`
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "worklog", "worklog") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".worklog")
    }
}

fn default_store_file() -> String {
    "sessions.json".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())
            .context("Failed to load config file")?;
        if let Ok(remote) = std::env::var("WORKLOG_REMOTE") {
            config.sync.remote = Some(remote);
        }
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(worklog_core::Error::from)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("WORKLOG_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Path of the session store document.
    pub fn store_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.store_file)
    }

    /// Export directory; relative paths resolve against `data_dir`.
    pub fn export_dir(&self) -> PathBuf {
        if self.sync.export_dir.is_absolute() {
            self.sync.export_dir.clone()
        } else {
            self.paths.data_dir.join(&self.sync.export_dir)
        }
    }

    /// Sync settings with the export directory resolved.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            export_dir: self.export_dir(),
            ..self.sync.clone()
        }
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.data_dir)
            .context("Failed to create data directory")?;
        std::fs::create_dir_all(self.export_dir())
            .context("Failed to create export directory")?;
        Ok(())
    }
}
