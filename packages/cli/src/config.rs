use scenarist_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scenarist project configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Change store used when a command is not given one
    #[serde(default = "default_change_store")]
    pub change_store: String,

    /// Author recorded on new changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Document options
    #[serde(flatten)]
    pub editor: EditorConfig,
}

fn default_change_store() -> String {
    "changes.jsonl".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the change store, or to `explicit` if given
    pub fn store_path(&self, cwd: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => cwd.join(path),
            None => cwd.join(&self.change_store),
        }
    }

    /// Configured author, falling back to the login name
    pub fn author(&self) -> Option<String> {
        self.user_name
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|name| !name.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            change_store: default_change_store(),
            user_name: None,
            editor: EditorConfig::default(),
        }
    }
}
