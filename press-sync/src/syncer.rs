//! Synchronizer — reconciles a batch of documents against the remote index.
//!
//! ## Per-document states
//!
//! 1. Rendered: render errors abort the batch.
//! 2. Filtered: the inclusion filter may drop the document.
//! 3. Slug-resolved: a document without a slug is skipped with a warning.
//! 4. Reconciled: edit the indexed post (reusing custom field ids) or create
//!    a new one.
//! 5. Synced: the slug joins the touched set.
//!
//! After the batch, delete-orphans mode removes every indexed post whose slug
//! was not touched.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use indexmap::IndexMap;
use log::{Level, Record};

use press_core::{
    config::MAX_BACKDATE_HOURS, types::POST_TAG_TAXONOMY, CustomField, PostContent, PostId,
    PressConfig,
};
use press_renderer::{Document, Renderer, Rendering};

use crate::error::{OrphanFailure, RemoteOperation, SyncError};
use crate::index::RemoteIndex;
use crate::transport::Transport;

/// Decides whether a parsed document takes part in the sync.
pub type FilterHook = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings of one synchronizer instance.
#[derive(Clone)]
pub struct SyncOptions {
    pub post_type: String,
    pub post_status: String,
    pub delete_orphans: bool,
    /// Send the rendering's tag list as `post_tag` terms.
    pub generate_tags: bool,
    pub page_size: usize,
    /// Offset subtracted from the current time for the publish date.
    pub backdate: Duration,
    /// Key of the custom field carrying the serialized attribute map.
    pub attributes_field: String,
    pub filter: Option<FilterHook>,
    /// Log sink; `None` uses the process-wide logger.
    pub logger: Option<Arc<dyn log::Log>>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&PressConfig::default())
    }
}

impl From<&PressConfig> for SyncOptions {
    fn from(config: &PressConfig) -> Self {
        SyncOptions {
            post_type: config.post_type.clone(),
            post_status: config.post_status.clone(),
            delete_orphans: config.delete_orphans,
            generate_tags: config.generate_tags,
            page_size: config.page_size,
            backdate: Duration::hours(config.backdate_hours.clamp(0, MAX_BACKDATE_HOURS)),
            attributes_field: config.attributes_field.clone(),
            filter: None,
            logger: None,
        }
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("post_type", &self.post_type)
            .field("post_status", &self.post_status)
            .field("delete_orphans", &self.delete_orphans)
            .field("generate_tags", &self.generate_tags)
            .field("page_size", &self.page_size)
            .field("backdate", &self.backdate)
            .field("attributes_field", &self.attributes_field)
            .field("filter", &self.filter.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Created {
        path: PathBuf,
        slug: String,
        post_id: PostId,
    },
    Updated {
        path: PathBuf,
        slug: String,
        post_id: PostId,
    },
    /// Dropped by the inclusion filter.
    Filtered { path: PathBuf },
    /// Skipped because the document declares no slug.
    MissingSlug { path: PathBuf },
}

impl DocumentOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DocumentOutcome::Created { path, .. }
            | DocumentOutcome::Updated { path, .. }
            | DocumentOutcome::Filtered { path }
            | DocumentOutcome::MissingSlug { path } => path,
        }
    }

    /// The synced slug, for created and updated documents.
    pub fn slug(&self) -> Option<&str> {
        match self {
            DocumentOutcome::Created { slug, .. } | DocumentOutcome::Updated { slug, .. } => {
                Some(slug)
            }
            _ => None,
        }
    }
}

/// Summary of one `sync` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One entry per input path, in input order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Slugs created or updated during the batch.
    pub touched: BTreeSet<String>,
    /// Orphans deleted by the cleanup pass.
    pub deleted: Vec<(String, PostId)>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                DocumentOutcome::Filtered { .. } | DocumentOutcome::MissingSlug { .. }
            )
        })
    }

    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Action a sync would take for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Create,
    Update { post_id: PostId },
    Filtered,
    MissingSlug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub path: PathBuf,
    pub slug: Option<String>,
    pub title: String,
    pub action: PlannedAction,
}

/// Dry classification of a batch; nothing is sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub documents: Vec<PlannedDocument>,
    /// Indexed posts no document in the batch would touch. Only deleted when
    /// delete-orphans mode is on.
    pub orphans: Vec<(String, PostId)>,
}

enum Resolved {
    Filtered,
    MissingSlug,
    Ready(Box<Rendering>, String),
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Pushes rendered documents to a remote backend.
///
/// The remote index is fetched once, in [`Synchronizer::new`], and reused for
/// every later call on the instance.
pub struct Synchronizer<T: Transport> {
    transport: T,
    renderer: Renderer,
    options: SyncOptions,
    index: RemoteIndex,
}

impl<T: Transport> Synchronizer<T> {
    /// Fetch the remote index through `transport`.
    pub fn new(mut transport: T, renderer: Renderer, options: SyncOptions) -> Result<Self, SyncError> {
        let index = RemoteIndex::build(&mut transport, &options.post_type, options.page_size)?;
        let sync = Synchronizer {
            transport,
            renderer,
            options,
            index,
        };
        sync.emit(Level::Info, &format!("Got {} posts", sync.index.len()));
        Ok(sync)
    }

    pub fn index(&self) -> &RemoteIndex {
        &self.index
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Sync every document in `paths`, in order.
    ///
    /// `custom_fields` are set on every post, in the caller's order, ahead of
    /// the attribute field. The first render or remote failure aborts the
    /// batch; documents processed before it stay synced.
    pub fn sync<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        custom_fields: &IndexMap<String, String>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        for path in paths {
            let outcome = self.sync_document(path.as_ref(), custom_fields)?;
            if let Some(slug) = outcome.slug() {
                if !report.touched.insert(slug.to_string()) {
                    self.emit(
                        Level::Warn,
                        &format!("slug '{slug}' synced more than once in this batch"),
                    );
                }
            }
            report.outcomes.push(outcome);
        }

        if self.options.delete_orphans {
            let failures = self.delete_orphans(&mut report);
            if !failures.is_empty() {
                return Err(SyncError::OrphanCleanup {
                    report: Box::new(report),
                    failures,
                });
            }
        }
        Ok(report)
    }

    /// Sync a single document. Does not run the orphan pass.
    pub fn sync_document(
        &mut self,
        path: &Path,
        custom_fields: &IndexMap<String, String>,
    ) -> Result<DocumentOutcome, SyncError> {
        let (rendering, slug) = match self.resolve(path)? {
            Resolved::Filtered => {
                return Ok(DocumentOutcome::Filtered {
                    path: path.to_path_buf(),
                })
            }
            Resolved::MissingSlug => {
                return Ok(DocumentOutcome::MissingSlug {
                    path: path.to_path_buf(),
                })
            }
            Resolved::Ready(rendering, slug) => (rendering, slug),
        };

        let mut content = self.build_content(&rendering, &slug, custom_fields)?;
        let existing = self.index.lookup(&slug).map(|post| {
            content.adopt_field_ids(&post.custom_fields);
            post.post_id
        });

        match existing {
            Some(post_id) => {
                self.emit(Level::Info, &format!("Editing post #{post_id} '{slug}'"));
                self.edit(post_id, &content)?;
                Ok(DocumentOutcome::Updated {
                    path: path.to_path_buf(),
                    slug,
                    post_id,
                })
            }
            None => {
                self.emit(Level::Info, &format!("Creating post '{slug}'"));
                let post_id = self.create(&content)?;
                Ok(DocumentOutcome::Created {
                    path: path.to_path_buf(),
                    slug,
                    post_id,
                })
            }
        }
    }

    /// Classify `paths` against the index without touching the backend.
    pub fn plan<P: AsRef<Path>>(&self, paths: &[P]) -> Result<SyncPlan, SyncError> {
        let mut plan = SyncPlan::default();
        let mut touched = BTreeSet::new();
        for path in paths {
            let path = path.as_ref();
            let rendering = self.renderer.render(path)?;
            let slug = rendering.slug().map(str::to_string);
            let action = if !self.included(&rendering) {
                PlannedAction::Filtered
            } else {
                match slug.as_deref() {
                    None => PlannedAction::MissingSlug,
                    Some(s) => {
                        touched.insert(s.to_string());
                        match self.index.lookup(s) {
                            Some(post) => PlannedAction::Update {
                                post_id: post.post_id,
                            },
                            None => PlannedAction::Create,
                        }
                    }
                }
            };
            plan.documents.push(PlannedDocument {
                path: path.to_path_buf(),
                slug,
                title: rendering.title,
                action,
            });
        }
        plan.orphans = self.index.orphans(&touched);
        Ok(plan)
    }

    /// The payload sent for `rendering` under `slug`.
    ///
    /// Custom fields carry no ids; matching against an existing post is the
    /// caller's job.
    pub fn build_content(
        &self,
        rendering: &Rendering,
        slug: &str,
        custom_fields: &IndexMap<String, String>,
    ) -> Result<PostContent, SyncError> {
        let mut fields: Vec<CustomField> = custom_fields
            .iter()
            .filter(|(key, _)| **key != self.options.attributes_field)
            .map(|(key, value)| CustomField::new(key.as_str(), value.as_str()))
            .collect();
        fields.push(CustomField::new(
            self.options.attributes_field.as_str(),
            rendering.attributes_json()?,
        ));

        let terms_names = self.options.generate_tags.then(|| {
            let mut terms = BTreeMap::new();
            terms.insert(POST_TAG_TAXONOMY.to_string(), rendering.tags.clone());
            terms
        });

        let post_date = Utc::now()
            .checked_sub_signed(self.options.backdate)
            .ok_or(SyncError::PublishDate {
                backdate: self.options.backdate,
            })?;

        Ok(PostContent {
            post_type: self.options.post_type.clone(),
            post_date,
            post_content: rendering.html.clone(),
            post_title: rendering.title.clone(),
            post_name: slug.to_string(),
            post_status: self.options.post_status.clone(),
            custom_fields: fields,
            terms_names,
        })
    }

    fn resolve(&self, path: &Path) -> Result<Resolved, SyncError> {
        let rendering = self.renderer.render(path)?;
        for line in &rendering.diagnostics {
            self.emit(Level::Warn, &format!("{}: {line}", path.display()));
        }
        if !self.included(&rendering) {
            log::debug!("filtered out: {}", path.display());
            return Ok(Resolved::Filtered);
        }
        let Some(slug) = rendering.slug().map(str::to_string) else {
            self.emit(
                Level::Warn,
                &format!("could not post, no slug for {}", path.display()),
            );
            return Ok(Resolved::MissingSlug);
        };
        Ok(Resolved::Ready(Box::new(rendering), slug))
    }

    fn included(&self, rendering: &Rendering) -> bool {
        self.options
            .filter
            .as_ref()
            .map_or(true, |filter| filter(&rendering.document))
    }

    // -- remote mutations ---------------------------------------------------

    fn create(&mut self, content: &PostContent) -> Result<PostId, SyncError> {
        let created = self
            .transport
            .new_post(content)
            .map_err(|source| SyncError::Transport {
                operation: RemoteOperation::NewPost,
                source,
            })?;
        created.ok_or_else(|| self.rejected(RemoteOperation::NewPost, &content.post_name))
    }

    fn edit(&mut self, post_id: PostId, content: &PostContent) -> Result<(), SyncError> {
        let edited = self
            .transport
            .edit_post(post_id, content)
            .map_err(|source| SyncError::Transport {
                operation: RemoteOperation::EditPost,
                source,
            })?;
        if !edited {
            return Err(self.rejected(RemoteOperation::EditPost, &content.post_name));
        }
        Ok(())
    }

    fn delete(&mut self, slug: &str, post_id: PostId) -> Result<(), SyncError> {
        let deleted = self
            .transport
            .delete_post(post_id)
            .map_err(|source| SyncError::Transport {
                operation: RemoteOperation::DeletePost,
                source,
            })?;
        if !deleted {
            return Err(self.rejected(RemoteOperation::DeletePost, slug));
        }
        Ok(())
    }

    fn rejected(&self, operation: RemoteOperation, target: &str) -> SyncError {
        SyncError::RemoteRejected {
            backend: self.transport.label().to_string(),
            operation,
            target: target.to_string(),
        }
    }

    /// Delete every indexed post outside `report.touched`, recording each
    /// deletion in `report.deleted`.
    ///
    /// Each orphan is attempted even if an earlier one failed.
    fn delete_orphans(&mut self, report: &mut SyncReport) -> Vec<OrphanFailure> {
        let mut failures = Vec::new();
        for (slug, post_id) in self.index.orphans(&report.touched) {
            self.emit(Level::Info, &format!("Deleting post #{post_id} '{slug}'"));
            match self.delete(&slug, post_id) {
                Ok(()) => report.deleted.push((slug, post_id)),
                Err(error) => {
                    self.emit(Level::Warn, &format!("could not delete '{slug}': {error}"));
                    failures.push(OrphanFailure {
                        slug,
                        post_id,
                        error,
                    });
                }
            }
        }
        failures
    }

    // -- logging ------------------------------------------------------------

    fn emit(&self, level: Level, message: &str) {
        let logger: &dyn log::Log = match &self.options.logger {
            Some(sink) => sink.as_ref(),
            None if level <= log::max_level() => log::logger(),
            None => return,
        };
        let label = self.transport.label();
        logger.log(
            &Record::builder()
                .level(level)
                .target(module_path!())
                .args(format_args!("{label}: {message}"))
                .build(),
        );
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Synchronizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("transport", &self.transport)
            .field("options", &self.options)
            .field("index", &self.index.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use press_core::RemotePost;
    use tempfile::TempDir;

    use super::*;
    use crate::transport::MemoryTransport;

    #[derive(Default)]
    struct Capture(Mutex<Vec<(Level, String)>>);

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }
        fn log(&self, record: &Record<'_>) {
            self.0
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
        fn flush(&self) {}
    }

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn post(id: u64, slug: &str) -> RemotePost {
        let mut post = RemotePost::new(id, slug);
        post.post_type = "post".to_string();
        post
    }

    #[test]
    fn options_follow_config() {
        let config = PressConfig {
            post_status: "publish".to_string(),
            backdate_hours: 2,
            ..PressConfig::default()
        };
        let options = SyncOptions::from(&config);
        assert_eq!(options.post_status, "publish");
        assert_eq!(options.backdate, Duration::hours(2));
        assert!(options.filter.is_none());
    }

    #[test]
    fn construction_logs_index_size_with_backend_prefix() {
        let capture = Arc::new(Capture::default());
        let options = SyncOptions {
            logger: Some(capture.clone()),
            ..SyncOptions::default()
        };
        let transport = MemoryTransport::with_posts(vec![post(1, "a"), post(2, "b")]);
        Synchronizer::new(transport, Renderer::new(), options).unwrap();

        let lines = capture.0.lock().unwrap();
        assert_eq!(lines[0], (Level::Info, "MEMORY: Got 2 posts".to_string()));
    }

    #[test]
    fn content_is_backdated_and_carries_attributes() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.adoc", "= Hello\n:slug: hello\n:tags: x\n\nBody\n");
        let sync =
            Synchronizer::new(MemoryTransport::new(), Renderer::new(), SyncOptions::default())
                .unwrap();
        let rendering = sync.renderer().render(&path).unwrap();

        let mut extra = IndexMap::new();
        extra.insert("source".to_string(), "docs".to_string());
        let before = Utc::now();
        let content = sync.build_content(&rendering, "hello", &extra).unwrap();
        let after = Utc::now();

        assert!(content.post_date >= before - Duration::hours(24));
        assert!(content.post_date <= after - Duration::hours(24));
        assert_eq!(content.post_title, "Hello");
        assert_eq!(content.post_status, "draft");
        assert_eq!(content.custom_fields.len(), 2);
        assert_eq!(content.custom_fields[0], CustomField::new("source", "docs"));
        assert_eq!(content.custom_fields[1].key, "adoc_attributes");
        assert!(content.custom_fields[1].value.contains("\"slug\":\"hello\""));
        assert!(content.custom_fields.iter().all(|f| f.id.is_none()));
        assert_eq!(content.terms_names, None);
    }

    #[test]
    fn caller_cannot_shadow_the_attribute_field() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.adoc", "= A\n:slug: a\n\nx\n");
        let sync =
            Synchronizer::new(MemoryTransport::new(), Renderer::new(), SyncOptions::default())
                .unwrap();
        let rendering = sync.renderer().render(&path).unwrap();

        let mut extra = IndexMap::new();
        extra.insert("adoc_attributes".to_string(), "bogus".to_string());
        let content = sync.build_content(&rendering, "a", &extra).unwrap();
        assert_eq!(content.custom_fields.len(), 1);
        assert_ne!(content.custom_fields[0].value, "bogus");
    }

    #[test]
    fn caller_field_order_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.adoc", "= A\n:slug: a\n\nx\n");
        let sync =
            Synchronizer::new(MemoryTransport::new(), Renderer::new(), SyncOptions::default())
                .unwrap();
        let rendering = sync.renderer().render(&path).unwrap();

        let mut extra = IndexMap::new();
        extra.insert("zeta".to_string(), "1".to_string());
        extra.insert("alpha".to_string(), "2".to_string());
        extra.insert("mid".to_string(), "3".to_string());
        let content = sync.build_content(&rendering, "a", &extra).unwrap();

        let keys: Vec<&str> = content.custom_fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid", "adoc_attributes"]);
    }

    #[test]
    fn out_of_range_backdate_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.adoc", "= A\n:slug: a\n\nx\n");
        let options = SyncOptions {
            backdate: Duration::days(365 * 1_000_000),
            ..SyncOptions::default()
        };
        let sync = Synchronizer::new(MemoryTransport::new(), Renderer::new(), options).unwrap();
        let rendering = sync.renderer().render(&path).unwrap();

        let err = sync
            .build_content(&rendering, "a", &IndexMap::new())
            .unwrap_err();
        assert!(matches!(err, SyncError::PublishDate { .. }), "{err}");
    }

    #[test]
    fn oversized_backdate_in_config_is_clamped() {
        let config = PressConfig {
            backdate_hours: i64::MAX,
            ..PressConfig::default()
        };
        let options = SyncOptions::from(&config);
        assert_eq!(options.backdate, Duration::hours(MAX_BACKDATE_HOURS));
    }

    #[test]
    fn plan_classifies_without_mutating() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(&dir, "new.adoc", "= New\n:slug: new\n\nx\n"),
            write(&dir, "old.adoc", "= Old\n:slug: old\n\nx\n"),
            write(&dir, "none.adoc", "= None\n\nx\n"),
        ];
        let transport = MemoryTransport::with_posts(vec![post(4, "old"), post(5, "gone")]);
        let sync = Synchronizer::new(transport, Renderer::new(), SyncOptions::default()).unwrap();

        let plan = sync.plan(&paths).unwrap();
        let actions: Vec<_> = plan.documents.iter().map(|d| d.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                PlannedAction::Create,
                PlannedAction::Update { post_id: PostId(4) },
                PlannedAction::MissingSlug,
            ]
        );
        assert_eq!(plan.orphans, vec![("gone".to_string(), PostId(5))]);
        assert_eq!(sync.transport().calls().len(), 1, "only the index listing");
    }

    #[test]
    fn report_counts() {
        let report = SyncReport {
            outcomes: vec![
                DocumentOutcome::Created {
                    path: "a".into(),
                    slug: "a".into(),
                    post_id: PostId(1),
                },
                DocumentOutcome::MissingSlug { path: "b".into() },
                DocumentOutcome::Filtered { path: "c".into() },
            ],
            ..SyncReport::default()
        };
        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 0);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.outcomes[1].path(), Path::new("b"));
    }
}
