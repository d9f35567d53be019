//! Pre-flight slug gate.
//!
//! Checks every document's slug before anything is sent upstream. The gate
//! is all-or-nothing: one bad slug anywhere blocks the whole batch, and the
//! error lists every violation so they can be fixed in one pass.

use std::path::{Path, PathBuf};

use press_core::SlugRules;
use press_renderer::Renderer;

use crate::error::SyncError;

/// A document whose slug breaks one or more rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugViolation {
    pub path: PathBuf,
    /// `None` when the document declares no slug.
    pub slug: Option<String>,
    /// Descriptions of the violated rules, in rule-set order.
    pub violations: Vec<String>,
}

/// Collect the slug violations of every document in `paths`.
///
/// Documents are parsed without renderer hooks. Unreadable documents abort
/// the check.
pub fn find_slug_violations<P: AsRef<Path>>(
    renderer: &Renderer,
    paths: &[P],
    rules: &SlugRules,
) -> Result<Vec<SlugViolation>, SyncError> {
    let mut found = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let document = renderer.load(path)?;
        let slug = document.attribute("slug");
        if !rules.is_valid(slug) {
            found.push(SlugViolation {
                path: path.to_path_buf(),
                slug: slug.map(str::to_string),
                violations: rules.violated(slug),
            });
        }
    }
    Ok(found)
}

/// Fail with [`SyncError::InvalidSlugs`] if any document's slug is invalid.
pub fn verify_slugs<P: AsRef<Path>>(
    renderer: &Renderer,
    paths: &[P],
    rules: &SlugRules,
) -> Result<(), SyncError> {
    let found = find_slug_violations(renderer, paths, rules)?;
    if found.is_empty() {
        return Ok(());
    }
    for v in &found {
        log::debug!("invalid slug {:?} in {}: {:?}", v.slug, v.path.display(), v.violations);
    }
    Err(SyncError::InvalidSlugs(found))
}
