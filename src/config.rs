use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ui::DEFAULT_PAGE_SIZE;

/// Errors that can occur during config operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_command() -> Vec<String> {
    vec!["/bin/sh".to_string()]
}

/// Persisted user defaults
///
/// Stored as JSON at `~/.config/kubectl-iexec/config.json` on Linux
/// (the platform config directory elsewhere). Command-line flags take
/// precedence over everything here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Decolorize prompt output
    #[serde(default)]
    pub naked: bool,
    /// Enable vim navigation keys in prompts
    #[serde(default)]
    pub vim_mode: bool,
    /// Rows shown at once in a prompt
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Command run when none is given on the command line
    #[serde(default = "default_command")]
    pub default_command: Vec<String>,
    /// Log level used when `--log-level` is absent
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naked: false,
            vim_mode: false,
            page_size: default_page_size(),
            default_command: default_command(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join("kubectl-iexec"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from `path`, falling back to defaults when it is absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;
        Ok(settings.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
        if self.default_command.is_empty() {
            self.default_command = default_command();
        }
        self
    }
}
