//! Mirror transport — a JSON file standing in for the remote backend.
//!
//! Persists a [`PostStore`] at a caller-chosen path, e.g. `remote.json`.
//! The store is loaded once; every successful mutation is written back with
//! the `.tmp` + rename pattern so a crash never leaves a torn file.

use std::path::{Path, PathBuf};

use press_core::{PostContent, PostFilter, PostId, RemotePost};

use crate::error::{io_err, TransportError};
use crate::store::PostStore;
use crate::transport::Transport;

/// Load the store at `path`.
///
/// Returns an empty store if the file does not yet exist.
pub fn load_at(path: &Path) -> Result<PostStore, TransportError> {
    if !path.exists() {
        return Ok(PostStore::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(PostStore::new());
    }
    let store: PostStore = serde_json::from_str(&contents)?;
    Ok(store.with_counters_past_existing())
}

/// Save the store at `path` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(path: &Path, store: &PostStore) -> Result<(), TransportError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let json = serde_json::to_string_pretty(store)?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.tmp", path.display()))
}

/// File-backed [`Transport`].
#[derive(Debug)]
pub struct MirrorTransport {
    path: PathBuf,
    store: PostStore,
}

impl MirrorTransport {
    /// Open (or start) the mirror at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let path = path.into();
        let store = load_at(&path)?;
        Ok(MirrorTransport { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    fn persist(&self) -> Result<(), TransportError> {
        save_at(&self.path, &self.store)
    }
}

impl Transport for MirrorTransport {
    fn label(&self) -> &str {
        "MIRROR"
    }

    fn list_posts(&mut self, filter: &PostFilter) -> Result<Vec<RemotePost>, TransportError> {
        Ok(self.store.list(filter))
    }

    fn new_post(&mut self, content: &PostContent) -> Result<Option<PostId>, TransportError> {
        let id = self.store.insert(content);
        self.persist()?;
        Ok(Some(id))
    }

    fn edit_post(
        &mut self,
        post_id: PostId,
        content: &PostContent,
    ) -> Result<bool, TransportError> {
        if !self.store.update(post_id, content) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn delete_post(&mut self, post_id: PostId) -> Result<bool, TransportError> {
        if !self.store.remove(post_id) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }
}
