use std::fs;
use std::sync::Arc;

use press_renderer::{RenderOptions, Renderer, Rendering};
use tempfile::TempDir;

const POST: &str = "\
// leading comment
= Release Notes 1.2
Docs Team <docs@example.com>
:slug: release-notes-1-2
:tags: releases , changelog,  product
:version: 1.2
:private:
:draft!:

Version {version} is out.

== Fixes

* crash on startup
* slow sync

[source,sh]
----
press sync docs/*.adoc
----
";

fn write_post(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("release-notes.adoc");
    fs::write(&path, POST).expect("write post");
    path
}

#[test]
fn realistic_post_renders_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let rendering = Renderer::new().render(&write_post(&dir)).expect("render");

    assert_eq!(rendering.title, "Release Notes 1.2");
    assert_eq!(rendering.slug(), Some("release-notes-1-2"));
    assert_eq!(rendering.attribute_value("author"), Some("Docs Team <docs@example.com>"));
    assert!(!rendering.attribute_exists("draft"), "unset attributes are dropped");
    assert_eq!(rendering.tags, vec!["releases", "changelog", "product", "private"]);

    assert!(rendering.html.contains("<p>Version 1.2 is out.</p>"), "got: {}", rendering.html);
    assert!(rendering.html.contains("<h2>Fixes</h2>"));
    assert!(rendering.html.contains("<li>crash on startup</li>"));
    assert!(rendering.html.contains("language-sh"));
    assert!(!rendering.html.contains("leading comment"));
    assert!(rendering.diagnostics.is_empty());
}

#[test]
fn rendering_serializes_without_the_document() {
    let dir = TempDir::new().expect("tempdir");
    let rendering = Renderer::new().render(&write_post(&dir)).expect("render");

    let value = serde_json::to_value(&rendering).expect("serialize");
    assert_eq!(value["title"], "Release Notes 1.2");
    assert_eq!(value["attributes"]["slug"], "release-notes-1-2");
    assert!(value.get("document").is_none());
}

#[test]
fn tag_hook_sees_final_title_and_attributes() {
    let dir = TempDir::new().expect("tempdir");
    let options = RenderOptions {
        extra_tags: Some(Arc::new(|r: &Rendering| {
            r.attribute_value("version")
                .map(|v| vec![format!("v{v}")])
                .unwrap_or_default()
        })),
        ..RenderOptions::default()
    };

    let rendering = Renderer::with_options(options)
        .render(&write_post(&dir))
        .expect("render");
    assert_eq!(rendering.tags.last().map(String::as_str), Some("v1.2"));
    assert_eq!(rendering.tags.len(), 5);
}
