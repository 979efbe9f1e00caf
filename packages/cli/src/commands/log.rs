use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scenarist_editor::FileChangeStore;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Change store file (defaults to the configured one)
    pub store: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn log(args: LogArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.store_path(cwd, args.store.as_deref());

    if !path.exists() {
        return Err(anyhow::anyhow!("Change store does not exist: {}", path.display()));
    }

    let records = FileChangeStore::read_records(&path)?;

    if args.format == "json" {
        let records: Vec<_> = records.iter().map(|record| record.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("📜 {} {}", "Change log".bright_blue().bold(), path.display());
    println!();

    for record in &records {
        let draft = if record.is_draft {
            " draft".yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "  {} {} {}{}",
            format!("#{}", record.sequence).cyan(),
            record.datetime.format("%Y-%m-%d %H:%M:%S"),
            record.author.bright_white(),
            draft
        );
        println!(
            "     {} undo {} bytes, redo {} bytes",
            record.id.to_string().dimmed(),
            record.undo_patch.len(),
            record.redo_patch.len()
        );
    }

    println!();
    println!("   Total changes: {}", records.len());

    Ok(())
}
