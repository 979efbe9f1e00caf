pub mod apply;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod replay;

pub use apply::{apply, ApplyArgs};
pub use commit::{commit, CommitArgs};
pub use diff::{diff, DiffArgs};
pub use init::{init, InitArgs};
pub use log::{log, LogArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::{anyhow, Context, Result};
use scenarist_editor::{BrotliCodec, PatchBlob, PatchCodec};
use std::path::Path;

/// Read a canonical script file, without its trailing newline
pub(crate) fn read_canonical(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}

/// Read an encoded patch: base64 of the compressed patch
pub(crate) fn read_patch(path: &Path) -> Result<PatchBlob> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    PatchBlob::from_base64(text.trim())
        .map_err(|err| anyhow!("{} is not an encoded patch: {}", path.display(), err))
}

pub(crate) fn codec() -> impl PatchCodec {
    BrotliCodec::default()
}
