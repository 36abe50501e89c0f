use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::undo_stack::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_CONFIG_NAME: &str = "pagebuilder.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Number of snapshots kept for undo
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Background save settings
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// Directory holding page documents (one JSON file per page)
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    30_000
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(cwd: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    /// Get absolute path to the pages directory
    pub fn get_pages_dir(&self, cwd: impl AsRef<Path>) -> PathBuf {
        cwd.as_ref().join(&self.pages_dir)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            autosave: AutosaveConfig::default(),
            pages_dir: default_pages_dir(),
        }
    }
}
