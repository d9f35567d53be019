//! `press sync <files..>` — push a batch of documents to the remote store.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use press_core::{PressConfig, SlugRules};
use press_renderer::Renderer;
use press_sync::{
    verify_slugs, DocumentOutcome, DryRunTransport, SyncError, SyncReport, Transport,
};

use super::check::print_violations;

/// Arguments for `press sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Documents to sync, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Log what would change without touching the remote store.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete remote posts no document in this batch produced.
    #[arg(long)]
    pub delete_orphans: bool,

    /// Send each document's tags along with it.
    #[arg(long)]
    pub generate_tags: bool,

    /// Post status to set, e.g. `publish` (default from config: `draft`).
    #[arg(long)]
    pub status: Option<String>,

    /// JSON store standing in for the remote backend.
    #[arg(long)]
    pub mirror: Option<PathBuf>,
}

impl SyncArgs {
    pub fn run(self, mut config: PressConfig) -> Result<()> {
        config.delete_orphans |= self.delete_orphans;
        config.generate_tags |= self.generate_tags;
        if let Some(status) = &self.status {
            config.post_status = status.clone();
        }
        config.validate().context("invalid sync options")?;

        match verify_slugs(&Renderer::new(), &self.files, &SlugRules::default()) {
            Ok(()) => {}
            Err(SyncError::InvalidSlugs(violations)) => {
                print_violations(&violations);
                bail!(
                    "{} document(s) have invalid slugs; nothing was synced",
                    violations.len()
                );
            }
            Err(err) => return Err(err).context("slug check failed"),
        }

        let mirror = super::open_mirror(self.mirror.as_ref(), &config)?;
        let report = if self.dry_run {
            run_batch(DryRunTransport::new(mirror), &config, &self.files, true)?
        } else {
            run_batch(mirror, &config, &self.files, false)?
        };
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn run_batch<T: Transport>(
    transport: T,
    config: &PressConfig,
    files: &[PathBuf],
    dry_run: bool,
) -> Result<SyncReport> {
    let mut sync = super::synchronizer(transport, config)?;
    match sync.sync(files, &config.custom_fields) {
        Ok(report) => Ok(report),
        Err(SyncError::OrphanCleanup { report, failures }) => {
            print_report(&report, dry_run);
            for failure in &failures {
                eprintln!(
                    "{} could not delete '{}' (#{}): {}",
                    "✗".red().bold(),
                    failure.slug,
                    failure.post_id,
                    failure.error
                );
            }
            bail!(
                "deleted {} orphaned post(s), {} failed",
                report.deleted.len(),
                failures.len()
            )
        }
        Err(err) => Err(err).context("sync failed"),
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} synced {} document(s) ({} created, {} updated, {} skipped, {} deleted)",
        "✓".green().bold(),
        report.touched.len(),
        report.created(),
        report.updated(),
        report.skipped(),
        report.deleted.len(),
    );

    for outcome in &report.outcomes {
        match outcome {
            DocumentOutcome::Created { slug, post_id, .. } => {
                println!("  +  {slug} (#{post_id})")
            }
            DocumentOutcome::Updated { slug, post_id, .. } => {
                println!("  ✎  {slug} (#{post_id})")
            }
            DocumentOutcome::Filtered { path } => {
                println!("  ·  {} (filtered)", path.display())
            }
            DocumentOutcome::MissingSlug { path } => {
                println!("  ·  {} (no slug)", path.display())
            }
        }
    }
    for (slug, post_id) in &report.deleted {
        println!("  -  {slug} (#{post_id})");
    }
}
