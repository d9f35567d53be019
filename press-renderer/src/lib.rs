//! # press-renderer
//!
//! Renders source documents into [`Rendering`]s: HTML, title, a normalized
//! attribute map and the derived tag list the synchronizer sends upstream.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use press_renderer::Renderer;
//!
//! fn show(path: &Path) {
//!     if let Ok(rendering) = Renderer::new().render(path) {
//!         println!("{} ({:?}): {} bytes", rendering.title, rendering.slug(), rendering.html.len());
//!     }
//! }
//! ```

pub mod engine;
pub mod error;
pub mod markup;
pub mod rendering;

pub use engine::{RenderOptions, Renderer, TagsHook, TextHook};
pub use error::{MarkupError, RenderError};
pub use markup::{AsciiMarkup, Diagnostics, Document, Markup};
pub use rendering::Rendering;
