//! Document renderer — [`RenderOptions`] hooks and [`Renderer`].
//!
//! # Pipeline
//!
//! 1. Read the source file.
//! 2. Run the `before_conversion` hook on the raw text.
//! 3. Parse, with includes resolved against the file's directory.
//! 4. Convert to HTML.
//! 5. Run the `after_conversion` hook on the HTML.
//! 6. Build the [`Rendering`] and derive its tags.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{read_err, RenderError};
use crate::markup::{AsciiMarkup, Diagnostics, Document, Markup};
use crate::rendering::Rendering;

/// Diagnostics containing this text are expected noise and never reported.
pub const SUPPRESSED_DIAGNOSTIC: &str = "out of sequence";

/// Text in, text out. Used for both conversion hooks.
pub type TextHook = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Extra tags for a rendering; appended after the derived tags.
pub type TagsHook = Arc<dyn Fn(&Rendering) -> Vec<String> + Send + Sync>;

/// Optional renderer hooks. `None` disables a hook.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Applied to the raw source text before parsing.
    pub before_conversion: Option<TextHook>,
    /// Applied to the converted HTML.
    pub after_conversion: Option<TextHook>,
    pub extra_tags: Option<TagsHook>,
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("before_conversion", &self.before_conversion.is_some())
            .field("after_conversion", &self.after_conversion.is_some())
            .field("extra_tags", &self.extra_tags.is_some())
            .finish()
    }
}

/// Renders source documents into [`Rendering`]s.
///
/// Create once and reuse across a batch.
pub struct Renderer {
    markup: Box<dyn Markup + Send + Sync>,
    options: RenderOptions,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// A renderer using [`AsciiMarkup`] and no hooks.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self::with_markup(AsciiMarkup, options)
    }

    /// A renderer backed by a caller-provided markup engine.
    pub fn with_markup(markup: impl Markup + Send + Sync + 'static, options: RenderOptions) -> Self {
        Renderer {
            markup: Box::new(markup),
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the document at `path`.
    ///
    /// Fails with [`RenderError::Read`] if the file cannot be read and with
    /// [`RenderError::Markup`] if the markup layer rejects it. Diagnostics
    /// never fail the render; the ones worth reporting end up in
    /// [`Rendering::diagnostics`].
    pub fn render(&self, path: &Path) -> Result<Rendering, RenderError> {
        let mut text = std::fs::read_to_string(path).map_err(|e| read_err(path, e))?;
        if let Some(hook) = &self.options.before_conversion {
            text = hook(text);
        }

        let mut diagnostics = Diagnostics::new();
        let document = self.parse(path, &text, &mut diagnostics)?;

        let mut html = self.markup.convert(&document);
        if let Some(hook) = &self.options.after_conversion {
            html = hook(html);
        }

        let mut rendering = Rendering::new(path, html, document);
        rendering.diagnostics = reportable(diagnostics);
        rendering.tags = rendering.base_tags();
        if let Some(hook) = &self.options.extra_tags {
            let extra = hook(&rendering);
            rendering.tags.extend(extra);
        }
        Ok(rendering)
    }

    /// Parse the document at `path` without hooks or conversion.
    ///
    /// Enough to inspect attributes, e.g. for slug checks across a batch.
    pub fn load(&self, path: &Path) -> Result<Document, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|e| read_err(path, e))?;
        let mut diagnostics = Diagnostics::new();
        self.parse(path, &text, &mut diagnostics)
    }

    fn parse(
        &self,
        path: &Path,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Document, RenderError> {
        let base_dir = base_dir_of(path)?;
        self.markup
            .parse(text, &base_dir, diagnostics)
            .map_err(|source| RenderError::Markup {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Absolute directory containing `path`.
fn base_dir_of(path: &Path) -> Result<PathBuf, RenderError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.canonicalize().map_err(|e| read_err(parent, e))
}

fn reportable(diagnostics: Diagnostics) -> Vec<String> {
    diagnostics
        .into_lines()
        .into_iter()
        .flat_map(|line| {
            line.split(['\n', '\r'])
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.contains(SUPPRESSED_DIAGNOSTIC))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
