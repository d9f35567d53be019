pub mod check;
pub mod diff;
pub mod plan;
pub mod render;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use press_core::{config, PressConfig};
use press_renderer::Renderer;
use press_sync::{MirrorTransport, SyncOptions, Synchronizer, Transport};

/// Load `explicit` (which must exist) or `./press.yaml` (which may not).
pub fn load_config(explicit: Option<&Path>) -> Result<PressConfig> {
    match explicit {
        Some(path) => config::load_at(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => config::load_or_default(Path::new(config::DEFAULT_FILE_NAME))
            .context("failed to load press.yaml"),
    }
}

/// The mirror store to use: the flag wins over the config file.
pub fn mirror_path(flag: Option<&PathBuf>, config: &PressConfig) -> Result<PathBuf> {
    flag.or(config.mirror.as_ref())
        .cloned()
        .context("no remote store configured; pass --mirror or set `mirror` in press.yaml")
}

pub fn open_mirror(flag: Option<&PathBuf>, config: &PressConfig) -> Result<MirrorTransport> {
    let path = mirror_path(flag, config)?;
    MirrorTransport::open(&path)
        .with_context(|| format!("failed to open remote store {}", path.display()))
}

pub fn synchronizer<T: Transport>(transport: T, config: &PressConfig) -> Result<Synchronizer<T>> {
    Synchronizer::new(transport, Renderer::new(), SyncOptions::from(config))
        .context("failed to fetch remote posts")
}
