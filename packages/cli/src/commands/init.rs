use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scenarist_editor::{CanonicalSerializer, EditorConfig, ScriptSerializer, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Author recorded on new changes
    #[arg(short, long)]
    pub user: Option<String>,

    /// Change store file
    #[arg(short, long, default_value = "changes.jsonl")]
    pub store: String,

    /// Mark new changes as drafts
    #[arg(long)]
    pub draft: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Scenarist project...".bright_blue().bold());

    // Create an empty script to start from
    let script = cwd.join("script.jsonl");
    if !script.exists() {
        fs::write(&script, ScriptSerializer.empty_document())?;
        println!("  {} Created script.jsonl", "✓".green());
    }

    let config = Config {
        change_store: args.store.clone(),
        user_name: args.user,
        editor: EditorConfig {
            draft_by_default: args.draft,
            ..EditorConfig::default()
        },
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit script.jsonl");
    println!("  2. Run: scenarist commit script.jsonl");
    println!("  3. Run: scenarist log to see {}", args.store);

    Ok(())
}
