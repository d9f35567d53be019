//! Unified diff between a remote post body and a fresh rendering.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use press_core::PostId;

use crate::syncer::Synchronizer;
use crate::transport::Transport;
use crate::SyncError;

/// Body diff for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDiff {
    pub path: PathBuf,
    pub slug: String,
    /// `None` when the slug is not on the remote yet; the diff is then
    /// against an empty body.
    pub post_id: Option<PostId>,
    /// Empty when both bodies match.
    pub unified_diff: String,
}

impl DocumentDiff {
    pub fn is_unchanged(&self) -> bool {
        self.unified_diff.is_empty()
    }
}

/// Render the document at `path` and diff it against its indexed post.
///
/// Nothing is sent upstream.
pub fn diff_document<T: Transport>(
    sync: &Synchronizer<T>,
    path: &Path,
) -> Result<DocumentDiff, SyncError> {
    let rendering = sync.renderer().render(path)?;
    let slug = rendering
        .slug()
        .ok_or_else(|| SyncError::MissingSlug {
            path: path.to_path_buf(),
        })?
        .to_string();

    let remote = sync.index().lookup(&slug);
    let before = remote
        .map(|post| normalize_line_endings(&post.post_content))
        .unwrap_or_default();
    let after = normalize_line_endings(&rendering.html);

    let unified_diff = if before == after {
        String::new()
    } else {
        let old_header = format!("remote/{slug}");
        let new_header = format!("local/{}", path.display());
        TextDiff::from_lines(&before, &after)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string()
    };

    Ok(DocumentDiff {
        path: path.to_path_buf(),
        slug,
        post_id: remote.map(|post| post.post_id),
        unified_diff,
    })
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
