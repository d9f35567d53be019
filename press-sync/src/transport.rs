//! Remote transport seam.
//!
//! The synchronizer only needs four procedures from the backend. Mutations
//! report success through their return value: `None` / `false` is a refusal,
//! which the synchronizer turns into a hard error. `Err` is reserved for the
//! transport failing to talk to the backend at all.

use std::collections::BTreeSet;

use press_core::{PostContent, PostFilter, PostId, RemotePost};

use crate::error::{RemoteOperation, TransportError};
use crate::store::PostStore;

/// Procedural interface to a remote content backend.
pub trait Transport {
    /// Short backend name used to prefix log lines, e.g. `WORDPRESS`.
    fn label(&self) -> &str;

    fn list_posts(&mut self, filter: &PostFilter) -> Result<Vec<RemotePost>, TransportError>;

    /// Create a post; `Some(id)` on success.
    fn new_post(&mut self, content: &PostContent) -> Result<Option<PostId>, TransportError>;

    fn edit_post(&mut self, post_id: PostId, content: &PostContent)
        -> Result<bool, TransportError>;

    fn delete_post(&mut self, post_id: PostId) -> Result<bool, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn list_posts(&mut self, filter: &PostFilter) -> Result<Vec<RemotePost>, TransportError> {
        (**self).list_posts(filter)
    }

    fn new_post(&mut self, content: &PostContent) -> Result<Option<PostId>, TransportError> {
        (**self).new_post(content)
    }

    fn edit_post(
        &mut self,
        post_id: PostId,
        content: &PostContent,
    ) -> Result<bool, TransportError> {
        (**self).edit_post(post_id, content)
    }

    fn delete_post(&mut self, post_id: PostId) -> Result<bool, TransportError> {
        (**self).delete_post(post_id)
    }
}

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// One call received by a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    List(PostFilter),
    New(PostContent),
    Edit(PostId, PostContent),
    Delete(PostId),
}

/// In-process backend that records every call.
///
/// Refusals can be scripted per operation ([`reject`](Self::reject)) or per
/// post ([`reject_post`](Self::reject_post)) to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: PostStore,
    calls: Vec<RecordedCall>,
    rejected_ops: BTreeSet<RemoteOperation>,
    rejected_posts: BTreeSet<PostId>,
    failing_ops: BTreeSet<RemoteOperation>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: impl IntoIterator<Item = RemotePost>) -> Self {
        MemoryTransport {
            store: PostStore::with_posts(posts),
            ..Self::default()
        }
    }

    /// Answer every `operation` with a falsy result.
    pub fn reject(mut self, operation: RemoteOperation) -> Self {
        self.rejected_ops.insert(operation);
        self
    }

    /// Answer edits and deletes of `post_id` with a falsy result.
    pub fn reject_post(mut self, post_id: PostId) -> Self {
        self.rejected_posts.insert(post_id);
        self
    }

    /// Fail every `operation` with a transport error.
    pub fn fail(mut self, operation: RemoteOperation) -> Self {
        self.failing_ops.insert(operation);
        self
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    /// Payloads of every create call, in order.
    pub fn created(&self) -> Vec<&PostContent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::New(content) => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Post ids and payloads of every edit call, in order.
    pub fn edited(&self) -> Vec<(PostId, &PostContent)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Edit(id, content) => Some((*id, content)),
                _ => None,
            })
            .collect()
    }

    /// Post ids of every delete call, in order.
    pub fn deleted(&self) -> Vec<PostId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Delete(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn check(&self, operation: RemoteOperation) -> Result<bool, TransportError> {
        if self.failing_ops.contains(&operation) {
            return Err(TransportError::Backend(format!("{operation} unavailable")));
        }
        Ok(!self.rejected_ops.contains(&operation))
    }
}

impl Transport for MemoryTransport {
    fn label(&self) -> &str {
        "MEMORY"
    }

    fn list_posts(&mut self, filter: &PostFilter) -> Result<Vec<RemotePost>, TransportError> {
        self.calls.push(RecordedCall::List(filter.clone()));
        self.check(RemoteOperation::GetPosts)?;
        Ok(self.store.list(filter))
    }

    fn new_post(&mut self, content: &PostContent) -> Result<Option<PostId>, TransportError> {
        self.calls.push(RecordedCall::New(content.clone()));
        if !self.check(RemoteOperation::NewPost)? {
            return Ok(None);
        }
        Ok(Some(self.store.insert(content)))
    }

    fn edit_post(
        &mut self,
        post_id: PostId,
        content: &PostContent,
    ) -> Result<bool, TransportError> {
        self.calls.push(RecordedCall::Edit(post_id, content.clone()));
        if !self.check(RemoteOperation::EditPost)? || self.rejected_posts.contains(&post_id) {
            return Ok(false);
        }
        Ok(self.store.update(post_id, content))
    }

    fn delete_post(&mut self, post_id: PostId) -> Result<bool, TransportError> {
        self.calls.push(RecordedCall::Delete(post_id));
        if !self.check(RemoteOperation::DeletePost)? || self.rejected_posts.contains(&post_id) {
            return Ok(false);
        }
        Ok(self.store.remove(post_id))
    }
}

// ---------------------------------------------------------------------------
// DryRunTransport
// ---------------------------------------------------------------------------

/// Label a [`DryRunTransport`] reports in place of its backend's.
pub const DRY_RUN_LABEL: &str = "DRY-RUN";

/// Lists through a real backend, but drops every mutation.
///
/// Every mutation is acknowledged so a dry run walks the same path a real
/// sync would, and the synchronizer's own log lines carry the `DRY-RUN`
/// label. Created posts report id `0`.
#[derive(Debug)]
pub struct DryRunTransport<T> {
    inner: T,
}

impl<T: Transport> DryRunTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for DryRunTransport<T> {
    fn label(&self) -> &str {
        DRY_RUN_LABEL
    }

    fn list_posts(&mut self, filter: &PostFilter) -> Result<Vec<RemotePost>, TransportError> {
        self.inner.list_posts(filter)
    }

    fn new_post(&mut self, _content: &PostContent) -> Result<Option<PostId>, TransportError> {
        Ok(Some(PostId(0)))
    }

    fn edit_post(
        &mut self,
        _post_id: PostId,
        _content: &PostContent,
    ) -> Result<bool, TransportError> {
        Ok(true)
    }

    fn delete_post(&mut self, _post_id: PostId) -> Result<bool, TransportError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn content(slug: &str) -> PostContent {
        PostContent {
            post_type: "post".to_string(),
            post_date: Utc::now(),
            post_content: String::new(),
            post_title: slug.to_string(),
            post_name: slug.to_string(),
            post_status: "draft".to_string(),
            custom_fields: vec![],
            terms_names: None,
        }
    }

    fn filter() -> PostFilter {
        PostFilter {
            post_type: "post".to_string(),
            number: 1000,
        }
    }

    #[test]
    fn memory_transport_records_calls_in_order() {
        let mut transport = MemoryTransport::new();
        transport.list_posts(&filter()).unwrap();
        let id = transport.new_post(&content("a")).unwrap().expect("created");
        assert!(transport.edit_post(id, &content("a")).unwrap());
        assert!(transport.delete_post(id).unwrap());

        assert_eq!(transport.calls().len(), 4);
        assert!(matches!(transport.calls()[0], RecordedCall::List(_)));
        assert_eq!(transport.created().len(), 1);
        assert_eq!(transport.edited()[0].0, id);
        assert_eq!(transport.deleted(), vec![id]);
    }

    #[test]
    fn rejected_operation_is_falsy() {
        let mut transport = MemoryTransport::new().reject(RemoteOperation::NewPost);
        assert_eq!(transport.new_post(&content("a")).unwrap(), None);
        assert!(transport.store().posts().is_empty());
    }

    #[test]
    fn rejected_post_is_falsy_for_edit_and_delete() {
        let mut transport =
            MemoryTransport::with_posts(vec![RemotePost::new(3, "a")]).reject_post(PostId(3));
        assert!(!transport.edit_post(PostId(3), &content("a")).unwrap());
        assert!(!transport.delete_post(PostId(3)).unwrap());
        assert_eq!(transport.store().posts().len(), 1);
    }

    #[test]
    fn failing_operation_is_transport_error() {
        let mut transport = MemoryTransport::new().fail(RemoteOperation::GetPosts);
        let err = transport.list_posts(&filter()).unwrap_err();
        assert!(err.to_string().contains("getPosts"));
    }

    #[test]
    fn dry_run_lists_through_and_never_mutates() {
        let mut seeded = RemotePost::new(1, "a");
        seeded.post_type = "post".to_string();
        let mut dry = DryRunTransport::new(MemoryTransport::with_posts(vec![seeded]));

        assert_eq!(dry.label(), DRY_RUN_LABEL);
        assert_eq!(dry.list_posts(&filter()).unwrap().len(), 1);
        assert_eq!(dry.new_post(&content("b")).unwrap(), Some(PostId(0)));
        assert!(dry.edit_post(PostId(1), &content("a")).unwrap());
        assert!(dry.delete_post(PostId(1)).unwrap());

        let inner = dry.into_inner();
        assert_eq!(inner.calls().len(), 1, "only the listing reaches the backend");
        assert_eq!(inner.store().posts().len(), 1);
    }

    #[test]
    fn boxed_transport_delegates() {
        let mut boxed: Box<dyn Transport> = Box::new(MemoryTransport::new());
        assert_eq!(boxed.label(), "MEMORY");
        assert!(boxed.new_post(&content("a")).unwrap().is_some());
    }
}
