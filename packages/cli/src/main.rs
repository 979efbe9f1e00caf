mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, commit, diff, init, log, replay, ApplyArgs, CommitArgs, DiffArgs, InitArgs, LogArgs,
    ReplayArgs,
};

/// Scenarist CLI - versioned screenplay history
#[derive(Parser, Debug)]
#[command(name = "scenarist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Scenarist project
    Init(InitArgs),

    /// Print the encoded patch between two scripts
    Diff(DiffArgs),

    /// Apply an encoded patch to a script
    Apply(ApplyArgs),

    /// Record a script's current content as a new change
    Commit(CommitArgs),

    /// List the records of a change store
    Log(LogArgs),

    /// Rebuild a script from a change store
    Replay(ReplayArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Diff(args) => diff(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Commit(args) => commit(args, &cwd),
        Command::Log(args) => log(args, &cwd),
        Command::Replay(args) => replay(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
