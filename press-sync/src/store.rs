//! Post store — the backend state behind the in-process transports.
//!
//! Mimics the remote backend's semantics closely enough to exercise the
//! synchronizer: post and custom-field ids are assigned on insert, a field
//! sent with an id is updated in place, a field sent without one is appended.

use serde::{Deserialize, Serialize};

use press_core::{
    types::POST_TAG_TAXONOMY, CustomField, PostContent, PostFilter, PostId, RemotePost,
};

/// Posts plus the id counters used to assign new ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStore {
    #[serde(default)]
    next_post_id: u64,
    #[serde(default)]
    next_field_id: u64,
    #[serde(default)]
    posts: Vec<RemotePost>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store; new ids continue after the highest existing ones.
    pub fn with_posts(posts: impl IntoIterator<Item = RemotePost>) -> Self {
        PostStore {
            next_post_id: 0,
            next_field_id: 0,
            posts: posts.into_iter().collect(),
        }
        .with_counters_past_existing()
    }

    /// Raise both id counters to at least the highest id in use.
    ///
    /// Stores read from disk may carry stale or missing counters.
    pub fn with_counters_past_existing(mut self) -> Self {
        let max_post = self.posts.iter().map(|p| p.post_id.0).max().unwrap_or(0);
        let max_field = self
            .posts
            .iter()
            .flat_map(|p| p.custom_fields.iter())
            .filter_map(|f| f.id)
            .max()
            .unwrap_or(0);
        self.next_post_id = self.next_post_id.max(max_post);
        self.next_field_id = self.next_field_id.max(max_field);
        self
    }

    pub fn posts(&self) -> &[RemotePost] {
        &self.posts
    }

    pub fn get(&self, post_id: PostId) -> Option<&RemotePost> {
        self.posts.iter().find(|p| p.post_id == post_id)
    }

    /// First post with the given slug.
    pub fn find_by_slug(&self, slug: &str) -> Option<&RemotePost> {
        self.posts.iter().find(|p| p.post_name == slug)
    }

    /// Posts of the filter's type, in insertion order, at most `number`.
    pub fn list(&self, filter: &PostFilter) -> Vec<RemotePost> {
        self.posts
            .iter()
            .filter(|p| p.post_type == filter.post_type)
            .take(filter.number)
            .cloned()
            .collect()
    }

    pub fn insert(&mut self, content: &PostContent) -> PostId {
        self.next_post_id += 1;
        let mut post = RemotePost::new(self.next_post_id, content.post_name.clone());
        self.apply(&mut post, content);
        let id = post.post_id;
        self.posts.push(post);
        id
    }

    /// Returns `false` when no post has `post_id`.
    pub fn update(&mut self, post_id: PostId, content: &PostContent) -> bool {
        let Some(idx) = self.posts.iter().position(|p| p.post_id == post_id) else {
            return false;
        };
        let mut post = self.posts[idx].clone();
        self.apply(&mut post, content);
        self.posts[idx] = post;
        true
    }

    /// Returns `false` when no post has `post_id`.
    pub fn remove(&mut self, post_id: PostId) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.post_id != post_id);
        self.posts.len() != before
    }

    fn apply(&mut self, post: &mut RemotePost, content: &PostContent) {
        post.post_name = content.post_name.clone();
        post.post_title = content.post_title.clone();
        post.post_content = content.post_content.clone();
        post.post_status = content.post_status.clone();
        post.post_type = content.post_type.clone();
        post.post_date = Some(content.post_date);
        for field in &content.custom_fields {
            self.apply_field(&mut post.custom_fields, field);
        }
        if let Some(tags) = content.tags() {
            post.terms.insert(POST_TAG_TAXONOMY.to_string(), tags.to_vec());
        }
    }

    fn apply_field(&mut self, fields: &mut Vec<CustomField>, incoming: &CustomField) {
        if let Some(id) = incoming.id {
            if let Some(existing) = fields.iter_mut().find(|f| f.id == Some(id)) {
                existing.key = incoming.key.clone();
                existing.value = incoming.value.clone();
                return;
            }
        }
        self.next_field_id += 1;
        fields.push(CustomField {
            key: incoming.key.clone(),
            value: incoming.value.clone(),
            id: Some(self.next_field_id),
        });
    }
}
