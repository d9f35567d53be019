//! `press plan <files..>` — classify a batch against the remote store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use press_core::PressConfig;
use press_sync::{PlannedAction, SyncPlan};

/// Arguments for `press plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Documents to plan.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// JSON store standing in for the remote backend.
    #[arg(long)]
    pub mirror: Option<PathBuf>,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "document")]
    document: String,
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "action")]
    action: String,
}

impl PlanArgs {
    pub fn run(self, config: &PressConfig) -> Result<()> {
        let transport = super::open_mirror(self.mirror.as_ref(), config)?;
        let sync = super::synchronizer(transport, config)?;
        let plan = sync.plan(&self.files).context("planning failed")?;
        print_plan(&plan, config.delete_orphans);
        Ok(())
    }
}

fn print_plan(plan: &SyncPlan, delete_orphans: bool) {
    let rows: Vec<PlanRow> = plan
        .documents
        .iter()
        .map(|doc| PlanRow {
            document: doc.path.display().to_string(),
            slug: doc.slug.clone().unwrap_or_else(|| "-".to_string()),
            title: doc.title.clone(),
            action: action_label(&doc.action),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if plan.orphans.is_empty() {
        return;
    }
    let heading = if delete_orphans {
        "Orphans (will be deleted):".red().bold()
    } else {
        "Orphans (kept; enable delete_orphans to remove):".yellow().bold()
    };
    println!("{heading}");
    for (slug, post_id) in &plan.orphans {
        println!("  #{post_id}  {slug}");
    }
}

fn action_label(action: &PlannedAction) -> String {
    match action {
        PlannedAction::Create => "create".to_string(),
        PlannedAction::Update { post_id } => format!("update #{post_id}"),
        PlannedAction::Filtered => "skip (filtered)".to_string(),
        PlannedAction::MissingSlug => "skip (no slug)".to_string(),
    }
}
