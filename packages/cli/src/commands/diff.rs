use super::{codec, read_canonical};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scenarist_editor::PatchCodec;
use scenarist_patch::diff_with_context;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Original canonical script
    pub old: PathBuf,

    /// Edited canonical script
    pub new: PathBuf,

    /// Write the encoded patch to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the readable patch instead of the encoded one
    #[arg(long)]
    pub readable: bool,

    /// Context characters around each change (overrides config)
    #[arg(short, long)]
    pub context: Option<usize>,
}

pub fn diff(args: DiffArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let old = read_canonical(&cwd.join(&args.old))?;
    let new = read_canonical(&cwd.join(&args.new))?;

    let context = args.context.unwrap_or(config.editor.context_chars);
    let patch = diff_with_context(&old, &new, context);

    if patch.is_empty() {
        eprintln!("{}", "No differences".yellow());
    }

    if args.readable {
        println!("{}", serde_json::to_string_pretty(&patch)?);
        return Ok(());
    }

    let encoded = codec().encode(&patch)?.to_base64();
    match args.output {
        Some(path) => {
            fs::write(cwd.join(&path), format!("{encoded}\n"))?;
            eprintln!(
                "{} {} hunks → {}",
                "✓".green(),
                patch.hunks.len(),
                path.display()
            );
        }
        None => println!("{encoded}"),
    }

    Ok(())
}
