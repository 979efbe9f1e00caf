use super::{codec, read_canonical};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scenarist_editor::{
    replay_records, CanonicalSerializer, ChangeLog, ChangeStore, FileChangeStore,
    InMemorySettings, ScriptDocument, ScriptSerializer, TextBuffer,
};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Canonical script holding the new version
    pub file: PathBuf,

    /// Change store file (defaults to the configured one)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Canonical script the first change was made against (defaults to an empty script)
    #[arg(short, long)]
    pub base: Option<PathBuf>,

    /// Mark the change as a draft
    #[arg(long)]
    pub draft: bool,
}

/// Record the difference between the stored history and a script file
pub fn commit(args: CommitArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if args.draft {
        config.editor.draft_by_default = true;
    }

    let store_path = config.store_path(cwd, args.store.as_deref());
    let store = FileChangeStore::open(&store_path)?;

    let base = match &args.base {
        Some(base) => read_canonical(&cwd.join(base))?,
        None => ScriptSerializer.empty_document(),
    };
    let recorded = replay_records(store.records(), &base, &codec())?;

    let settings = match config.author() {
        Some(name) => InMemorySettings::with_user(name),
        None => InMemorySettings::new(),
    };

    let mut doc = ScriptDocument::script(ChangeLog::new(store, settings), config.editor.clone())?;
    doc.load(&recorded)?;

    let edited = read_canonical(&cwd.join(&args.file))?;
    doc.buffer_mut().clear();
    doc.import_at(0, &edited)?;
    debug!(blocks = doc.buffer().blocks().len(), "Imported edited script");

    match doc.commit()? {
        Some(record) => {
            println!(
                "{} Recorded change {} by {}",
                "✓".green(),
                format!("#{}", record.sequence).cyan(),
                record.author.bright_white()
            );
            println!("   {}", doc.last_snapshot_hash().to_string().dimmed());
        }
        None => println!("{}", "Nothing to commit".yellow()),
    }

    Ok(())
}
