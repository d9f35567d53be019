//! Error types for press-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure other than a missing file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// The file parsed but holds values the synchronizer cannot use.
    #[error("invalid config: {0}")]
    Invalid(String),
}
