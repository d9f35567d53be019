//! [`Rendering`] — normalized output of rendering one source document.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::markup::Document;

/// Tag appended when the document declares a `public` attribute.
pub const PUBLIC_TAG: &str = "public";
/// Tag appended when the document declares a `private` attribute.
pub const PRIVATE_TAG: &str = "private";

fn list_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*,\s*").expect("static list separator"))
}

/// HTML, title and attributes of one rendered document.
#[derive(Debug, Clone, Serialize)]
pub struct Rendering {
    /// File the rendering was produced from.
    pub source: PathBuf,
    pub html: String,
    /// Declared document title; may be overridden before syncing.
    pub title: String,
    /// Set attributes, lowercase keys. Explicitly unset attributes are absent.
    pub attributes: BTreeMap<String, String>,
    /// Tags sent to the backend when tag generation is enabled.
    pub tags: Vec<String>,
    /// Parser diagnostics that survived filtering.
    pub diagnostics: Vec<String>,
    #[serde(skip)]
    pub document: Document,
}

impl Rendering {
    /// Build a rendering from a parsed document and its converted HTML.
    ///
    /// `tags` starts out empty; see [`Rendering::base_tags`].
    pub fn new(source: impl Into<PathBuf>, html: String, document: Document) -> Self {
        let attributes = document
            .attributes
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
            .collect();
        let title = document
            .doctitle
            .clone()
            .unwrap_or_default();
        Rendering {
            source: source.into(),
            html,
            title,
            attributes,
            tags: Vec::new(),
            diagnostics: Vec::new(),
            document,
        }
    }

    /// The value of `name`, or `None` when the attribute is absent.
    ///
    /// An attribute set to the empty string is present: `Some("")`.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// The value of `name`, or `default` when absent.
    pub fn attribute_value_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attribute_value(name).unwrap_or(default)
    }

    /// The value of `name` split on commas, each item trimmed.
    ///
    /// Returns `default` when absent. An empty value splits to `[""]`.
    pub fn list_attribute_value(&self, name: &str, default: Vec<String>) -> Vec<String> {
        match self.attribute_value(name) {
            None => default,
            Some(value) => list_separator()
                .split(value)
                .map(|item| item.trim().to_string())
                .collect(),
        }
    }

    /// Whether `name` is declared, regardless of its value.
    pub fn attribute_exists(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_lowercase())
    }

    /// The document's slug, the join key against remote posts.
    pub fn slug(&self) -> Option<&str> {
        self.attribute_value("slug")
    }

    /// Tags derived from the attributes alone: the `tags` list, then
    /// `public` and `private` markers when those attributes exist.
    pub fn base_tags(&self) -> Vec<String> {
        let mut tags = self.list_attribute_value("tags", Vec::new());
        if self.attribute_exists(PUBLIC_TAG) {
            tags.push(PUBLIC_TAG.to_string());
        }
        if self.attribute_exists(PRIVATE_TAG) {
            tags.push(PRIVATE_TAG.to_string());
        }
        tags
    }

    /// The attribute map as a JSON object, for storage in a custom field.
    pub fn attributes_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.attributes)
    }
}
