use super::{codec, read_canonical};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use scenarist_editor::{replay_records, CanonicalSerializer, FileChangeStore, ScriptSerializer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Change store file (defaults to the configured one)
    pub store: Option<PathBuf>,

    /// Canonical script the first change was made against (defaults to an empty script)
    #[arg(short, long)]
    pub base: Option<PathBuf>,

    /// Stop after the change with this sequence number
    #[arg(short, long)]
    pub until: Option<u64>,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.store_path(cwd, args.store.as_deref());

    if !path.exists() {
        return Err(anyhow!("Change store does not exist: {}", path.display()));
    }

    let base = match &args.base {
        Some(base) => read_canonical(&cwd.join(base))?,
        None => ScriptSerializer.empty_document(),
    };

    let mut records = FileChangeStore::read_records(&path)?;
    if let Some(until) = args.until {
        records.retain(|record| record.sequence <= until);
    }

    let text = replay_records(&records, &base, &codec())?;

    match args.output {
        Some(output) => {
            fs::write(cwd.join(&output), format!("{text}\n"))?;
            eprintln!(
                "{} Replayed {} changes → {}",
                "✓".green(),
                records.len(),
                output.display()
            );
        }
        None => println!("{text}"),
    }

    Ok(())
}
