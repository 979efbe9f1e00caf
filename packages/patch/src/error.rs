use thiserror::Error;

pub type PatchResult<T> = Result<T, PatchError>;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Hunk {index} does not match the text it is applied to")]
    HunkNotFound { index: usize },

    #[error("Malformed patch: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Failed to compress patch: {0}")]
    Compress(std::io::Error),

    #[error("Failed to decompress patch: {0}")]
    Decompress(std::io::Error),

    #[error("Decompressed patch is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid canonical layout: {reason}")]
    Layout { reason: String },
}

impl PatchError {
    pub fn layout(reason: impl Into<String>) -> Self {
        Self::Layout {
            reason: reason.into(),
        }
    }

    /// True when the patch bytes themselves are unusable, as opposed to a
    /// well-formed patch that does not fit the text.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            PatchError::Malformed(_) | PatchError::Decompress(_) | PatchError::InvalidUtf8(_)
        )
    }
}
