//! Press — publish AsciiDoc documents to a remote content backend.
//!
//! # Usage
//!
//! ```text
//! press check <files..>
//! press render <file> [--json]
//! press plan <files..> [--mirror store.json]
//! press diff <file> [--mirror store.json]
//! press sync <files..> [--dry-run] [--delete-orphans] [--generate-tags] [--status S] [--mirror store.json]
//! ```
//!
//! Every command reads `press.yaml` from the working directory when present;
//! `--config` points elsewhere.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    check::CheckArgs, diff::DiffArgs, plan::PlanArgs, render::RenderArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "press",
    version,
    about = "Sync AsciiDoc documents to a remote content backend",
    long_about = None,
)]
struct Cli {
    /// Config file (defaults to ./press.yaml if it exists).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the slugs of a batch of documents.
    Check(CheckArgs),

    /// Render one document and show its title, tags and attributes.
    Render(RenderArgs),

    /// Show what sync would create, update and delete.
    Plan(PlanArgs),

    /// Show a unified diff of the remote body against a fresh rendering.
    Diff(DiffArgs),

    /// Create, update and optionally delete remote posts.
    Sync(SyncArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Render(args) => args.run(),
        Commands::Plan(args) => args.run(&config),
        Commands::Diff(args) => args.run(&config),
        Commands::Sync(args) => args.run(config),
    }
}

/// Route `log` records from the libraries to stderr; `RUST_LOG` overrides
/// the default `info` filter.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
