//! Error types for press-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised by a [`Markup`](crate::Markup) implementation.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Includes nested deeper than the markup allows, usually a cycle.
    #[error("include depth limit of {limit} exceeded at {target}")]
    IncludeDepth { target: PathBuf, limit: usize },

    /// Anything else a third-party markup backend reports as fatal.
    #[error("{0}")]
    Other(String),
}

/// All errors that can arise from rendering a source document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The source document could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The markup layer rejected the document.
    #[error("failed to render {path}: {source}")]
    Markup {
        path: PathBuf,
        #[source]
        source: MarkupError,
    },
}

pub(crate) fn read_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Read {
        path: path.into(),
        source,
    }
}
