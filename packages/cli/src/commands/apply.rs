use super::{codec, read_canonical, read_patch};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use scenarist_editor::PatchCodec;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Canonical script to patch
    pub file: PathBuf,

    /// Encoded patch file
    pub patch: PathBuf,

    /// Write the result back to the script instead of stdout
    #[arg(short, long)]
    pub in_place: bool,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.file);
    let text = read_canonical(&path)?;
    let blob = read_patch(&cwd.join(&args.patch))?;

    let patch = codec()
        .decode(&blob)
        .with_context(|| format!("Cannot decode {}", args.patch.display()))?;
    let patched = scenarist_patch::apply(&text, &patch)
        .with_context(|| format!("Patch does not fit {}", args.file.display()))?;

    if args.in_place {
        fs::write(&path, format!("{patched}\n"))?;
        eprintln!(
            "{} Applied {} hunks to {}",
            "✓".green(),
            patch.hunks.len(),
            args.file.display()
        );
    } else {
        println!("{patched}");
    }

    Ok(())
}
