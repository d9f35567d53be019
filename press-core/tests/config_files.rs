//! Config file loading against real files on disk.

use assert_fs::prelude::*;
use predicates::prelude::*;
use press_core::{
    config::{self, DEFAULT_FILE_NAME},
    ConfigError, PressConfig,
};

#[test]
fn full_config_round_trips_through_disk() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(DEFAULT_FILE_NAME);
    file.write_str(
        "post_type: article\n\
         post_status: publish\n\
         delete_orphans: true\n\
         generate_tags: true\n\
         page_size: 50\n\
         backdate_hours: 2\n\
         custom_fields:\n  team: docs\n  origin: git\n",
    )
    .expect("write");

    let config = config::load_at(file.path()).expect("load");
    assert_eq!(config.post_type, "article");
    assert_eq!(config.post_status, "publish");
    assert!(config.delete_orphans);
    assert!(config.generate_tags);
    assert_eq!(config.page_size, 50);
    assert_eq!(config.backdate_hours, 2);
    let keys: Vec<_> = config.custom_fields.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["team", "origin"]);
}

#[test]
fn unknown_value_type_is_a_parse_error_naming_the_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(DEFAULT_FILE_NAME);
    file.write_str("delete_orphans: sometimes\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(predicate::str::contains(DEFAULT_FILE_NAME).eval(&err.to_string()));
}

#[test]
fn negative_backdate_is_invalid() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(DEFAULT_FILE_NAME);
    file.write_str("backdate_hours: -1\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
}

#[test]
fn absolute_mirror_path_is_kept() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let mirror = dir.child("elsewhere").child("remote.json");
    let file = dir.child(DEFAULT_FILE_NAME);
    file.write_str(&format!("mirror: {}\n", mirror.path().display()))
        .expect("write");

    let config: PressConfig = config::load_at(file.path()).expect("load");
    assert_eq!(config.mirror.as_deref(), Some(mirror.path()));
}
