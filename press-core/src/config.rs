//! YAML configuration for a sync session.
//!
//! ```yaml
//! post_type: post
//! post_status: draft
//! delete_orphans: false
//! generate_tags: true
//! page_size: 1000
//! backdate_hours: 24
//! custom_fields:
//!   source: docs-repo
//! mirror: ./remote.json
//! ```
//!
//! Every key is optional. Runtime hooks are not configurable here; they are
//! set in code on the renderer and synchronizer options.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Conventional config file name, looked up in the working directory.
pub const DEFAULT_FILE_NAME: &str = "press.yaml";

/// Key of the reserved custom field that carries the full attribute map.
pub const DEFAULT_ATTRIBUTES_FIELD: &str = "adoc_attributes";

/// Upper bound on `backdate_hours`: one hundred years.
pub const MAX_BACKDATE_HOURS: i64 = 24 * 365 * 100;

/// Recognized configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// Remote post type every synced document is filed under.
    pub post_type: String,
    /// Status assigned to created and edited posts.
    pub post_status: String,
    /// Delete remote posts whose slug no local document produced.
    pub delete_orphans: bool,
    /// Send the derived tag list with each post.
    pub generate_tags: bool,
    /// Page size of the single listing call made at session start.
    pub page_size: usize,
    /// How far in the past the publish timestamp is set.
    pub backdate_hours: i64,
    /// Extra custom fields set on every post, in file order.
    pub custom_fields: IndexMap<String, String>,
    pub attributes_field: String,
    /// JSON store used as the remote backend by the command-line tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<PathBuf>,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            post_type: "post".to_string(),
            post_status: "draft".to_string(),
            delete_orphans: false,
            generate_tags: false,
            page_size: 1000,
            backdate_hours: 24,
            custom_fields: IndexMap::new(),
            attributes_field: DEFAULT_ATTRIBUTES_FIELD.to_string(),
            mirror: None,
        }
    }
}

impl PressConfig {
    /// Parse and validate a YAML document.
    ///
    /// `path` is only used to annotate parse errors.
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty file is a valid, all-defaults config.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PressConfig = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the synchronizer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.post_type.trim().is_empty() {
            return Err(ConfigError::Invalid("post_type must not be empty".to_string()));
        }
        if self.post_status.trim().is_empty() {
            return Err(ConfigError::Invalid("post_status must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        if self.backdate_hours < 0 {
            return Err(ConfigError::Invalid(
                "backdate_hours must not be negative".to_string(),
            ));
        }
        if self.backdate_hours > MAX_BACKDATE_HOURS {
            return Err(ConfigError::Invalid(format!(
                "backdate_hours must be at most {MAX_BACKDATE_HOURS}"
            )));
        }
        if self.attributes_field.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "attributes_field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the config at `path`.
///
/// Returns [`ConfigError::NotFound`] if absent and [`ConfigError::Parse`]
/// (with path + line context) if malformed.
pub fn load_at(path: &Path) -> Result<PressConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    let mut config = PressConfig::from_yaml_str(&contents, path)?;

    // A relative mirror path is relative to the config file, not the cwd.
    if let (Some(mirror), Some(dir)) = (config.mirror.as_mut(), path.parent()) {
        if mirror.is_relative() {
            *mirror = dir.join(&*mirror);
        }
    }
    Ok(config)
}

/// Like [`load_at`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<PressConfig, ConfigError> {
    match load_at(path) {
        Err(ConfigError::NotFound { .. }) => Ok(PressConfig::default()),
        other => other,
    }
}
