//! Domain types shared by the renderer, the synchronizer and the transports.
//!
//! Field names follow the remote backend's vocabulary (`post_name`,
//! `post_content`, `custom_fields`, ...) so payloads serialize to the shape
//! the backend expects without an extra mapping layer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Remote-assigned identifier of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Remote records
// ---------------------------------------------------------------------------

/// A key/value pair attached to a post.
///
/// `id` is assigned by the backend and is only known for fields that are
/// already persisted remotely. Sending a field with an `id` updates it in
/// place; sending it without one appends a new field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl CustomField {
    /// A field that has not been persisted yet.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            id: None,
        }
    }
}

/// A post as returned by the backend's listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub post_id: PostId,
    /// The slug; unique among remote records.
    pub post_name: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub post_content: String,
    #[serde(default)]
    pub post_status: String,
    #[serde(default)]
    pub post_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Taxonomy terms by name, e.g. `post_tag`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terms: BTreeMap<String, Vec<String>>,
}

impl RemotePost {
    /// A post with only its identity set.
    pub fn new(post_id: impl Into<PostId>, post_name: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            post_name: post_name.into(),
            post_title: String::new(),
            post_content: String::new(),
            post_status: String::new(),
            post_type: String::new(),
            post_date: None,
            custom_fields: Vec::new(),
            terms: BTreeMap::new(),
        }
    }

    /// Look up a persisted custom field by key.
    pub fn custom_field(&self, key: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|f| f.key == key)
    }
}

// ---------------------------------------------------------------------------
// Outgoing payloads
// ---------------------------------------------------------------------------

/// Taxonomy key under which tags are sent in `terms_names`.
pub const POST_TAG_TAXONOMY: &str = "post_tag";

/// Content payload sent with a create or edit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub post_type: String,
    pub post_date: DateTime<Utc>,
    pub post_content: String,
    pub post_title: String,
    pub post_name: String,
    pub post_status: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Taxonomy terms by name; only present when tag generation is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_names: Option<BTreeMap<String, Vec<String>>>,
}

impl PostContent {
    /// Tags carried by this payload, if tag generation was enabled.
    pub fn tags(&self) -> Option<&[String]> {
        self.terms_names
            .as_ref()
            .and_then(|terms| terms.get(POST_TAG_TAXONOMY))
            .map(Vec::as_slice)
    }

    /// Attach the ids of already-persisted fields from `existing`.
    ///
    /// Fields whose key has no remote counterpart are left without an id so
    /// the backend creates them.
    pub fn adopt_field_ids(&mut self, existing: &[CustomField]) {
        for field in &mut self.custom_fields {
            if let Some(found) = existing.iter().find(|f| f.key == field.key) {
                field.id = found.id;
            }
        }
    }
}

/// Filter for the listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    pub post_type: String,
    /// Maximum number of posts returned.
    pub number: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
