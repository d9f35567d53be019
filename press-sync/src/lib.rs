//! # press-sync
//!
//! Reconciles rendered documents with a remote content backend.
//!
//! Build a [`Synchronizer`] over a [`Transport`], then call
//! [`Synchronizer::sync`] with the batch of source paths. Run
//! [`verify_slugs`] first to reject the batch before anything is sent if a
//! slug is invalid.

pub mod diff;
pub mod error;
pub mod index;
pub mod mirror;
pub mod store;
pub mod syncer;
pub mod transport;
pub mod verify;

pub use diff::{diff_document, DocumentDiff};
pub use error::{OrphanFailure, RemoteOperation, SyncError, TransportError};
pub use index::RemoteIndex;
pub use mirror::MirrorTransport;
pub use store::PostStore;
pub use syncer::{
    DocumentOutcome, FilterHook, PlannedAction, PlannedDocument, SyncOptions, SyncPlan,
    SyncReport, Synchronizer,
};
pub use transport::{DryRunTransport, MemoryTransport, RecordedCall, Transport, DRY_RUN_LABEL};
pub use verify::{find_slug_violations, verify_slugs, SlugViolation};
