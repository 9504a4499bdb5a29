//! End-to-end CLI tests for the mortar binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn mortar() -> Command {
    Command::cargo_bin("mortar").unwrap()
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scaffold(root: &Path) {
    write_file(
        root,
        "mortar.yml",
        r#"source_directory: source
build_directory: build

builds:
  src: {}
  min:
    shrink_vars: true

packages:
  core:
    files: [core.js]
"#,
    );
    write_file(root, "source/core.js", "var core = 1; // comment\n");
}

// ============================================================================
// Build
// ============================================================================

#[test]
fn test_build_generates_artifacts() {
    let temp = TempDir::new().unwrap();
    scaffold(temp.path());

    mortar()
        .arg("build")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("2 written"));

    assert_eq!(
        fs::read_to_string(temp.path().join("build/core-src.js")).unwrap(),
        "var core = 1; // comment"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("build/core-min.js")).unwrap(),
        "var core = 1;"
    );
}

#[test]
fn test_second_build_is_incremental() {
    let temp = TempDir::new().unwrap();
    scaffold(temp.path());

    mortar().arg("build").arg(temp.path()).assert().success();

    mortar()
        .arg("build")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created").not())
        .stdout(predicate::str::contains("0 written, 2 up to date"));
}

#[test]
fn test_force_rebuilds_everything() {
    let temp = TempDir::new().unwrap();
    scaffold(temp.path());

    mortar().arg("build").arg(temp.path()).assert().success();

    mortar()
        .arg("build")
        .arg("--force")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written"));
}

#[test]
fn test_json_output() {
    let temp = TempDir::new().unwrap();
    scaffold(temp.path());

    let output = mortar()
        .arg("build")
        .arg("--json")
        .arg(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["written"].as_array().unwrap().len(), 2);
}

#[test]
fn test_build_without_config_fails() {
    let temp = TempDir::new().unwrap();

    mortar()
        .arg("build")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load build configuration"));
}

#[test]
fn test_unresolved_extends_is_fatal() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "mortar.yml",
        "packages:\n  child:\n    extends: ghost\n    files: [a.js]\n",
    );

    mortar()
        .arg("build")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown target 'ghost'"));
}

#[test]
fn test_missing_source_fails_but_writes_the_rest() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "mortar.yml",
        r#"source_directory: source
build_directory: build

builds:
  src: {}

packages:
  good:
    files: [good.js]
  broken:
    files: [missing.js]
"#,
    );
    write_file(temp.path(), "source/good.js", "var g = 1;\n");

    mortar()
        .arg("build")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("artifact(s) failed"));

    assert!(temp.path().join("build/good-src.js").is_file());
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_then_build() {
    let temp = TempDir::new().unwrap();

    mortar()
        .arg("init")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    mortar().arg("build").arg(temp.path()).assert().success();
    assert!(temp.path().join("build/core-min.js").is_file());
}

#[test]
fn test_init_refuses_to_clobber() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mortar.yml", "packages:\n  core: [core.js]\n");

    mortar()
        .arg("init")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_generate() {
    mortar()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("mortar"));
}
