// Integration tests for the checked-in defaults and test data.

use std::path::{Path, PathBuf};

fn crate_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    if cwd.join("defaults").exists() {
        cwd
    } else {
        cwd.join("crates/aerial-app")
    }
}

fn assert_valid_toml(path: &Path) {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("{} should exist", path.display()));
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(
        parsed.is_ok(),
        "{} is not valid TOML: {:?}",
        path.display(),
        parsed.err()
    );
}

/// Verify that defaults/league.toml is valid TOML.
#[test]
fn league_toml_is_valid() {
    assert_valid_toml(&crate_root().join("defaults/league.toml"));
}

/// Verify that defaults/pipeline.toml is valid TOML.
#[test]
fn pipeline_toml_is_valid() {
    assert_valid_toml(&crate_root().join("defaults/pipeline.toml"));
}

/// Every label key in the default league file names a known contribution kind.
#[test]
fn default_labels_cover_every_kind() {
    let content = std::fs::read_to_string(crate_root().join("defaults/league.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&content).unwrap();
    let labels = parsed["labels"].as_table().expect("[labels] table");
    for kind in aerial_core::ContributionKind::ALL {
        assert!(labels.contains_key(kind.name()), "missing label for {kind}");
    }
    assert_eq!(labels.len(), aerial_core::ContributionKind::ALL.len());
}

/// Verify that the test fixture files are valid JSON.
#[test]
fn fixture_files_are_valid_json() {
    for name in ["tests/fixtures/data.json", "tests/fixtures/fixtures.json"] {
        let path = crate_root().join(name);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("{} should exist", path.display()));
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&content);
        assert!(parsed.is_ok(), "{name} is not valid JSON: {:?}", parsed.err());
    }
}

/// Verify that all expected directories exist.
#[test]
fn directory_structure_exists() {
    let root = crate_root();
    for dir in ["src", "src/source", "defaults", "tests/fixtures"] {
        assert!(root.join(dir).is_dir(), "missing directory {dir}");
    }
}
