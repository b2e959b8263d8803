//! Tool settings loaded from the global config file
//!
//! Settings live in `mcpsync/config.toml` under the platform config
//! directory. Everything is optional; CLI flags take precedence over
//! the file, which takes precedence over built-in defaults.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default debounce window for the watch daemon, in seconds.
pub const DEFAULT_DEBOUNCE_SECS: u64 = 2;

/// Persistent tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Debounce window for the watch daemon, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_secs: Option<u64>,

    /// Apply destructive changes without prompting.
    #[serde(default)]
    pub force: bool,

    /// Application names the daemon watches. Empty means all installed
    /// applications.
    #[serde(default)]
    pub watch: Vec<String>,
}

impl Settings {
    /// Load settings from the global config file, falling back to
    /// defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match Self::global_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse settings file: {}", path.display()))
    }

    /// Location of the global settings file, if the config directory
    /// can be resolved.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("mcpsync").join("config.toml"))
    }

    /// Effective debounce window: the CLI value wins when given.
    #[must_use]
    pub fn debounce(&self, cli_secs: Option<u64>) -> Duration {
        let secs = cli_secs
            .or(self.debounce_secs)
            .unwrap_or(DEFAULT_DEBOUNCE_SECS);
        Duration::from_secs(secs)
    }
}
