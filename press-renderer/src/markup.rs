//! Markup layer — turns source text into a [`Document`] and HTML.
//!
//! [`Markup`] is the seam to whatever markup engine is in use. The bundled
//! [`AsciiMarkup`] understands the parts of AsciiDoc that matter for
//! synchronization: the document header (`= Title` plus `:name: value`
//! attribute entries), `include::` directives, section titles, listing
//! blocks and attribute references. Everything else is handed to
//! pulldown-cmark, so inline formatting follows CommonMark rules.
//!
//! Non-fatal problems (missing includes, out-of-sequence sections) are
//! collected in [`Diagnostics`] instead of being printed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pulldown_cmark::{html::push_html, Options, Parser};
use regex::{Captures, Regex};

use crate::error::MarkupError;

/// Deepest include nesting accepted before the document is rejected.
pub const MAX_INCLUDE_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Advisory messages emitted while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.lines.push(message.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Title declared by the `= Title` header line.
    pub doctitle: Option<String>,
    /// Document attributes with lowercase keys. `None` marks an attribute
    /// that was explicitly unset (`:name!:`).
    pub attributes: BTreeMap<String, Option<String>>,
    /// Body prepared for conversion.
    pub body: String,
    /// Directory relative includes were resolved against.
    pub base_dir: PathBuf,
}

impl Document {
    /// Value of a set attribute; `None` when absent or unset.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .and_then(|v| v.as_deref())
    }
}

/// A markup engine.
pub trait Markup {
    /// Parse `text`, resolving relative includes against `base_dir`.
    fn parse(
        &self,
        text: &str,
        base_dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Document, MarkupError>;

    /// Convert a parsed document to HTML.
    fn convert(&self, document: &Document) -> String;
}

// ---------------------------------------------------------------------------
// AsciiMarkup
// ---------------------------------------------------------------------------

fn attribute_entry() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^:(!)?([A-Za-z0-9_][A-Za-z0-9_-]*)(!)?:(?:[ \t]+(.*))?$")
            .expect("static attribute entry pattern")
    })
}

fn include_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^include::([^\[]+)\[[^\]]*\]\s*$").expect("static include pattern")
    })
}

fn section_title() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(={1,6})[ \t]+(\S.*)$").expect("static section pattern"))
}

fn attribute_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_][A-Za-z0-9_-]*)\}").expect("static reference pattern")
    })
}

fn source_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[source(?:,\s*([^,\]\s]+))?[^\]]*\]$").expect("static source pattern")
    })
}

const LISTING_DELIMITER: &str = "----";
const COMMENT_DELIMITER: &str = "////";

fn is_line_comment(line: &str) -> bool {
    line.starts_with("//") && !line.starts_with(COMMENT_DELIMITER)
}

/// Replace `{name}` with the value of a set attribute; unknown references
/// are left as written.
fn substitute(line: &str, attributes: &BTreeMap<String, Option<String>>) -> String {
    attribute_reference()
        .replace_all(line, |caps: &Captures| {
            match attributes.get(&caps[1].to_lowercase()) {
                Some(Some(value)) => value.clone(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Apply `line` if it is an attribute entry. Returns whether it was one.
fn apply_attribute_entry(line: &str, attributes: &mut BTreeMap<String, Option<String>>) -> bool {
    let Some(caps) = attribute_entry().captures(line.trim_end()) else {
        return false;
    };
    let name = caps[2].to_lowercase();
    let unset = caps.get(1).is_some() || caps.get(3).is_some();
    let value = if unset {
        None
    } else {
        Some(
            caps.get(4)
                .map(|m| substitute(m.as_str().trim(), attributes))
                .unwrap_or_default(),
        )
    };
    attributes.insert(name, value);
    true
}

fn expand_includes(
    text: &str,
    base_dir: &Path,
    depth: usize,
    diagnostics: &mut Diagnostics,
    out: &mut Vec<String>,
) -> Result<(), MarkupError> {
    for line in text.lines() {
        let Some(caps) = include_directive().captures(line) else {
            out.push(line.to_string());
            continue;
        };
        let target = base_dir.join(caps[1].trim());
        if depth >= MAX_INCLUDE_DEPTH {
            return Err(MarkupError::IncludeDepth {
                target,
                limit: MAX_INCLUDE_DEPTH,
            });
        }
        match std::fs::read_to_string(&target) {
            Ok(included) => {
                let nested_base = target
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| base_dir.to_path_buf());
                expand_includes(&included, &nested_base, depth + 1, diagnostics, out)?;
            }
            Err(_) => {
                diagnostics.warn(format!("include file not found: {}", target.display()));
                out.push(format!("Unresolved directive - {line}"));
            }
        }
    }
    Ok(())
}

/// AsciiDoc-flavoured markup backed by pulldown-cmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiMarkup;

impl AsciiMarkup {
    /// Consume the header block starting at `idx`; returns the index of the
    /// first body line.
    fn parse_header(lines: &[String], mut idx: usize, doc: &mut Document) -> usize {
        while idx < lines.len() && (lines[idx].trim().is_empty() || is_line_comment(&lines[idx])) {
            idx += 1;
        }
        let Some(caps) = lines.get(idx).and_then(|l| section_title().captures(l)) else {
            return idx;
        };
        if caps[1].len() != 1 {
            return idx;
        }
        doc.doctitle = Some(caps[2].trim().to_string());
        idx += 1;

        let mut implicit = ["author", "revnumber"].into_iter();
        while idx < lines.len() && !lines[idx].trim().is_empty() {
            let line = &lines[idx];
            idx += 1;
            if is_line_comment(line) || apply_attribute_entry(line, &mut doc.attributes) {
                continue;
            }
            // Author and revision lines directly under the title.
            if let Some(name) = implicit.next() {
                doc.attributes
                    .entry(name.to_string())
                    .or_insert_with(|| Some(line.trim().to_string()));
            }
        }
        idx
    }

    /// A `title` attribute overrides the header title; without either, the
    /// first section title stands in.
    fn resolve_title(doc: &mut Document, first_section: Option<String>) {
        if let Some(title) = doc.attribute("title").map(str::to_string) {
            doc.doctitle = Some(title);
        } else if doc.doctitle.is_none() {
            doc.doctitle = first_section;
        }
        if let Some(title) = &doc.doctitle {
            doc.attributes
                .entry("doctitle".to_string())
                .or_insert_with(|| Some(title.clone()));
        }
    }
}

impl Markup for AsciiMarkup {
    fn parse(
        &self,
        text: &str,
        base_dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Document, MarkupError> {
        let mut lines = Vec::new();
        expand_includes(text, base_dir, 0, diagnostics, &mut lines)?;

        let mut doc = Document {
            base_dir: base_dir.to_path_buf(),
            ..Document::default()
        };
        let start = Self::parse_header(&lines, 0, &mut doc);

        let mut body = String::with_capacity(text.len());
        let mut in_listing = false;
        let mut in_comment = false;
        let mut pending_language: Option<String> = None;
        let mut last_level = 0usize;
        let mut first_section: Option<String> = None;

        for line in &lines[start..] {
            let trimmed = line.trim_end();
            if in_comment {
                in_comment = trimmed != COMMENT_DELIMITER;
                continue;
            }
            if in_listing {
                if trimmed == LISTING_DELIMITER {
                    body.push_str("```\n");
                    in_listing = false;
                } else {
                    body.push_str(line);
                    body.push('\n');
                }
                continue;
            }
            if trimmed == COMMENT_DELIMITER {
                in_comment = true;
                continue;
            }
            if is_line_comment(line) {
                continue;
            }
            if trimmed == LISTING_DELIMITER {
                in_listing = true;
                body.push_str("```");
                if let Some(language) = pending_language.take() {
                    body.push_str(&language);
                }
                body.push('\n');
                continue;
            }
            if let Some(caps) = source_style().captures(trimmed) {
                pending_language = Some(caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default());
                continue;
            }
            if apply_attribute_entry(line, &mut doc.attributes) {
                continue;
            }
            pending_language = None;

            if let Some(caps) = section_title().captures(trimmed) {
                let marks = caps[1].len();
                let level = marks - 1;
                if level == 0 {
                    diagnostics.warn("level 0 sections can only be used when doctype is book");
                } else if level > last_level + 1 {
                    diagnostics.warn(format!(
                        "section title out of sequence: expected level {}, got level {}",
                        last_level + 1,
                        level
                    ));
                }
                last_level = level;
                let title = substitute(&caps[2], &doc.attributes).trim().to_string();
                body.push_str(&"#".repeat(marks));
                body.push(' ');
                body.push_str(&title);
                body.push('\n');
                first_section.get_or_insert(title);
                continue;
            }

            body.push_str(&substitute(line, &doc.attributes));
            body.push('\n');
        }

        if in_listing {
            diagnostics.warn("unterminated listing block");
            body.push_str("```\n");
        }

        doc.body = body;
        Self::resolve_title(&mut doc, first_section);
        Ok(doc)
    }

    fn convert(&self, document: &Document) -> String {
        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(&document.body, options);
        let mut html = String::with_capacity(document.body.len() * 2);
        push_html(&mut html, parser);
        html
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn parse(text: &str) -> (Document, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let doc = AsciiMarkup
            .parse(text, Path::new("."), &mut diagnostics)
            .expect("parse");
        (doc, diagnostics)
    }

    #[test]
    fn header_title_and_attributes() {
        let (doc, diagnostics) = parse("= Hello World\n:slug: hello-world\n:Tags: a, b\n\nBody text.\n");
        assert_eq!(doc.doctitle.as_deref(), Some("Hello World"));
        assert_eq!(doc.attribute("slug"), Some("hello-world"));
        assert_eq!(doc.attribute("tags"), Some("a, b"), "keys are lowercased");
        assert_eq!(doc.attribute("doctitle"), Some("Hello World"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn title_attribute_overrides_header_title() {
        let (doc, _) = parse("= Header Title\n:title: Chosen Title\n:slug: t\n\nx\n");
        assert_eq!(doc.doctitle.as_deref(), Some("Chosen Title"));
        assert_eq!(doc.attribute("doctitle"), Some("Chosen Title"));
    }

    #[test]
    fn first_section_titles_an_untitled_document() {
        let (doc, _) = parse(":slug: s\n\nIntro.\n\n== First Part\n\ntext\n\n== Second Part\n");
        assert_eq!(doc.doctitle.as_deref(), Some("First Part"));
        assert!(doc.body.contains("## First Part"));
    }

    #[test]
    fn empty_valued_attribute_is_present() {
        let (doc, _) = parse("= T\n:public:\n\nx\n");
        assert_eq!(doc.attributes.get("public"), Some(&Some(String::new())));
    }

    #[test]
    fn unset_attribute_has_no_value() {
        let (doc, _) = parse("= T\n:draft!:\n:!hidden:\n\nx\n");
        assert_eq!(doc.attributes.get("draft"), Some(&None));
        assert_eq!(doc.attributes.get("hidden"), Some(&None));
        assert_eq!(doc.attribute("draft"), None);
    }

    #[test]
    fn author_line_under_title() {
        let (doc, _) = parse("= T\nJane Doe <jane@example.com>\n:slug: t\n\nx\n");
        assert_eq!(doc.attribute("author"), Some("Jane Doe <jane@example.com>"));
        assert_eq!(doc.attribute("slug"), Some("t"));
    }

    #[test]
    fn document_without_title() {
        let (doc, _) = parse(":slug: untitled\n\nJust text.\n");
        assert!(doc.doctitle.is_none());
        assert_eq!(doc.attribute("slug"), Some("untitled"));
        assert!(doc.body.contains("Just text."));
    }

    #[test]
    fn attribute_references_are_substituted() {
        let (doc, _) = parse("= T\n:product: Press\n\nWelcome to {product}, {unknown}.\n");
        let html = AsciiMarkup.convert(&doc);
        assert!(html.contains("Welcome to Press, {unknown}."), "got: {html}");
    }

    #[test]
    fn sections_become_headings() {
        let (doc, diagnostics) = parse("= T\n\n== Intro\n\ntext\n\n=== Detail\n");
        let html = AsciiMarkup.convert(&doc);
        assert!(html.contains("<h2>Intro</h2>"), "got: {html}");
        assert!(html.contains("<h3>Detail</h3>"), "got: {html}");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn skipped_section_level_is_diagnosed() {
        let (_, diagnostics) = parse("= T\n\n=== Too deep\n");
        assert_eq!(diagnostics.lines().len(), 1);
        assert!(diagnostics.lines()[0].contains("out of sequence"));
    }

    #[test]
    fn listing_blocks_are_verbatim() {
        let (doc, _) = parse("= T\n\n[source,rust]\n----\nlet x = {y};\n// not a comment\n----\n");
        let html = AsciiMarkup.convert(&doc);
        assert!(html.contains("language-rust"), "got: {html}");
        assert!(html.contains("let x = {y};"));
        assert!(html.contains("// not a comment"));
    }

    #[test]
    fn unterminated_listing_is_closed_and_diagnosed() {
        let (doc, diagnostics) = parse("= T\n\n----\ncode\n");
        assert!(doc.body.ends_with("```\n"));
        assert_eq!(diagnostics.lines(), &["unterminated listing block".to_string()]);
    }

    #[test]
    fn comments_are_dropped() {
        let (doc, _) = parse("= T\n\n// hidden\n////\nblock hidden\n////\nshown\n");
        assert!(!doc.body.contains("hidden"));
        assert!(doc.body.contains("shown"));
    }

    #[test]
    fn includes_resolve_against_base_dir() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("parts")).expect("mkdir");
        fs::write(dir.path().join("parts/a.adoc"), "From A.\ninclude::b.adoc[]\n").expect("write");
        fs::write(dir.path().join("parts/b.adoc"), "From B.\n").expect("write");

        let mut diagnostics = Diagnostics::new();
        let doc = AsciiMarkup
            .parse("= T\n\ninclude::parts/a.adoc[]\n", dir.path(), &mut diagnostics)
            .expect("parse");
        assert!(doc.body.contains("From A."));
        assert!(doc.body.contains("From B."), "nested include is relative to its file");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_include_is_diagnosed_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let mut diagnostics = Diagnostics::new();
        let doc = AsciiMarkup
            .parse("= T\n\ninclude::nope.adoc[]\n", dir.path(), &mut diagnostics)
            .expect("parse");
        assert!(doc.body.contains("Unresolved directive"));
        assert!(diagnostics.lines()[0].contains("include file not found"));
    }

    #[test]
    fn recursive_include_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("loop.adoc"), "include::loop.adoc[]\n").expect("write");
        let mut diagnostics = Diagnostics::new();
        let err = AsciiMarkup
            .parse("include::loop.adoc[]\n", dir.path(), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, MarkupError::IncludeDepth { .. }), "got: {err}");
    }
}
