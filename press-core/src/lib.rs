//! Press core library — domain types, slug rules, configuration.
//!
//! - [`types`] — remote records and outgoing payloads
//! - [`slug`] — rule-based slug validation
//! - [`config`] — YAML configuration
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

pub use config::PressConfig;
pub use error::ConfigError;
pub use slug::SlugRules;
pub use types::{CustomField, PostContent, PostFilter, PostId, RemotePost};
