//! Remote index — snapshot of existing remote posts keyed by slug.
//!
//! Built once from a single listing call and never refreshed: mutations made
//! during the session are not reflected here. Two documents sharing a slug
//! that is new to the backend therefore both produce a create.

use std::collections::{BTreeMap, BTreeSet};

use press_core::{PostFilter, PostId, RemotePost};

use crate::error::{RemoteOperation, SyncError};
use crate::transport::Transport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteIndex {
    by_slug: BTreeMap<String, RemotePost>,
}

impl RemoteIndex {
    /// List every post of `post_type` (up to `page_size`) and index it.
    pub fn build<T: Transport + ?Sized>(
        transport: &mut T,
        post_type: &str,
        page_size: usize,
    ) -> Result<Self, SyncError> {
        let filter = PostFilter {
            post_type: post_type.to_string(),
            number: page_size,
        };
        let posts = transport
            .list_posts(&filter)
            .map_err(|source| SyncError::Transport {
                operation: RemoteOperation::GetPosts,
                source,
            })?;
        Ok(Self::from_posts(posts))
    }

    /// Index `posts` by `post_name`; a later duplicate replaces an earlier one.
    pub fn from_posts(posts: impl IntoIterator<Item = RemotePost>) -> Self {
        let by_slug = posts
            .into_iter()
            .map(|post| (post.post_name.clone(), post))
            .collect();
        RemoteIndex { by_slug }
    }

    pub fn lookup(&self, slug: &str) -> Option<&RemotePost> {
        self.by_slug.get(slug)
    }

    pub fn all_slugs(&self) -> BTreeSet<&str> {
        self.by_slug.keys().map(String::as_str).collect()
    }

    /// Slug and post id of every indexed post whose slug is not in `touched`,
    /// in slug order.
    pub fn orphans(&self, touched: &BTreeSet<String>) -> Vec<(String, PostId)> {
        self.by_slug
            .iter()
            .filter(|(slug, _)| !touched.contains(*slug))
            .map(|(slug, post)| (slug.clone(), post.post_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}
