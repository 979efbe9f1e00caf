//! Error types for the editor

use scenarist_patch::PatchError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Malformed fragment at line {line}: {reason}")]
    MalformedFragment { line: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Change store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EditorError {
    pub fn malformed_fragment(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedFragment {
            line,
            reason: reason.into(),
        }
    }

    /// True when a stored or received patch could not be used at all
    pub fn is_corrupt_patch(&self) -> bool {
        matches!(self, EditorError::Patch(err) if err.is_corrupt())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode change record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Corrupt change record on line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
