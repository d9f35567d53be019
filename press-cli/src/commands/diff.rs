//! `press diff <file>` — unified diff of the remote body against a fresh rendering.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use press_core::PressConfig;
use press_sync::diff_document;

/// Arguments for `press diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Document to diff.
    pub file: PathBuf,

    /// JSON store standing in for the remote backend.
    #[arg(long)]
    pub mirror: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self, config: &PressConfig) -> Result<()> {
        let transport = super::open_mirror(self.mirror.as_ref(), config)?;
        let sync = super::synchronizer(transport, config)?;

        let diff = diff_document(&sync, &self.file)
            .with_context(|| format!("diff failed for {}", self.file.display()))?;

        if diff.is_unchanged() {
            println!("No differences for '{}'.", diff.slug);
            return Ok(());
        }

        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
