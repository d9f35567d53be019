//! Error types for press-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use press_core::PostId;
use press_renderer::RenderError;

use crate::syncer::SyncReport;
use crate::verify::SlugViolation;

/// Remote calls the synchronizer makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RemoteOperation {
    GetPosts,
    NewPost,
    EditPost,
    DeletePost,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteOperation::GetPosts => write!(f, "getPosts"),
            RemoteOperation::NewPost => write!(f, "newPost"),
            RemoteOperation::EditPost => write!(f, "editPost"),
            RemoteOperation::DeletePost => write!(f, "deletePost"),
        }
    }
}

/// Errors reported by a [`Transport`](crate::Transport) itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (mirror store).
    #[error("mirror store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by the backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A single orphan the cleanup pass could not delete.
#[derive(Debug)]
pub struct OrphanFailure {
    pub slug: String,
    pub post_id: PostId,
    pub error: SyncError,
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A source document could not be read or rendered.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The backend answered a mutation with a falsy result.
    #[error("{backend} {operation} failed for '{target}'")]
    RemoteRejected {
        backend: String,
        operation: RemoteOperation,
        target: String,
    },

    /// The transport could not complete a call.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: RemoteOperation,
        #[source]
        source: TransportError,
    },

    /// The pre-flight slug gate found invalid slugs.
    #[error("invalid slugs in {} document(s); cannot continue", .0.len())]
    InvalidSlugs(Vec<SlugViolation>),

    /// A document has no slug where one is required.
    #[error("no slug declared in {path}")]
    MissingSlug { path: PathBuf },

    /// Some orphaned posts could not be deleted; the rest were.
    ///
    /// `report` is the complete batch result, deletions included.
    #[error("failed to delete {} orphaned post(s)", .failures.len())]
    OrphanCleanup {
        report: Box<SyncReport>,
        failures: Vec<OrphanFailure>,
    },

    /// The configured backdate puts the publish date outside the
    /// representable range.
    #[error("publish date out of range: backdate of {backdate}")]
    PublishDate { backdate: chrono::Duration },

    /// The attribute map could not be serialized into its custom field.
    #[error("attribute serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`TransportError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TransportError {
    TransportError::Io {
        path: path.into(),
        source,
    }
}
