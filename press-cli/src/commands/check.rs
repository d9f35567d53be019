//! `press check <files..>` — slug gate for a batch of documents.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use press_core::SlugRules;
use press_renderer::Renderer;
use press_sync::{find_slug_violations, SlugViolation};

/// Arguments for `press check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Documents to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let violations = find_slug_violations(&Renderer::new(), &self.files, &SlugRules::default())
            .context("slug check failed")?;
        if !violations.is_empty() {
            print_violations(&violations);
            bail!("{} document(s) have invalid slugs", violations.len());
        }
        println!(
            "{} {} document(s) have valid slugs",
            "✓".green().bold(),
            self.files.len()
        );
        Ok(())
    }
}

/// Print every violating document with the rules it breaks.
pub fn print_violations(violations: &[SlugViolation]) {
    for v in violations {
        let slug = v.slug.as_deref().unwrap_or("<none>");
        eprintln!("{} {} ({})", "✗".red().bold(), v.path.display(), slug.bold());
        for rule in &v.violations {
            eprintln!("    - {rule}");
        }
    }
}
