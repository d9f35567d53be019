//! `press render <file>` — inspect what one document renders to.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use press_renderer::Renderer;

/// Arguments for `press render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Document to render.
    pub file: PathBuf,

    /// Emit the rendering as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also print the HTML body.
    #[arg(long, conflicts_with = "json")]
    pub html: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let rendering = Renderer::new()
            .render(&self.file)
            .with_context(|| format!("failed to render {}", self.file.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rendering)
                    .context("failed to serialize rendering")?
            );
            return Ok(());
        }

        println!("{} {}", "title:".bold(), rendering.title);
        println!(
            "{} {}",
            "slug:".bold(),
            rendering.slug().unwrap_or("<none>")
        );
        println!("{} {}", "tags:".bold(), rendering.tags.join(", "));
        println!("{}", "attributes:".bold());
        for (key, value) in &rendering.attributes {
            println!("  {key} = {value}");
        }
        for line in &rendering.diagnostics {
            eprintln!("{} {line}", "warning:".yellow().bold());
        }
        if self.html {
            println!();
            print!("{}", rendering.html);
        }
        Ok(())
    }
}
