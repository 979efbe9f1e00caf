use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "scenarist.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum number of undo levels kept in memory
    pub undo_capacity: usize,

    /// Draft flag given to newly committed changes
    pub draft_by_default: bool,

    /// Commit on every buffer change notification
    pub auto_commit: bool,

    /// Characters of context stored around each patch hunk
    pub context_chars: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_capacity: 50,
            draft_by_default: false,
            auto_commit: false,
            context_chars: scenarist_patch::DEFAULT_CONTEXT_CHARS,
        }
    }
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write config into a directory
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(DEFAULT_CONFIG_NAME), content)?;
        Ok(())
    }
}
