//! Inheritance resolution tests: directories, headers, packer settings

use mortar_build::{Emit, Project, ProjectConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn build_project(root: &Path, yaml: &str) -> Project {
    let config = ProjectConfig::from_yaml(yaml, Path::new("mortar.yml")).unwrap();
    Project::new(root, config).unwrap()
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

// ============================================================================
// Directory Inheritance
// ============================================================================

#[test]
fn test_child_inherits_parent_directory() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/core/a.js", "var a = 1;\n");
    write_file(temp.path(), "source/core/b.js", "var b = 2;\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  src: {}

packages:
  base:
    directory: core
    files: [a.js]
  child:
    extends: base
    files: [b.js]
"#;
    let project = build_project(temp.path(), yaml);

    let child = project.lookup("child").unwrap();
    assert_eq!(
        child.directory(&project).unwrap(),
        temp.path().join("source/core")
    );
    // parent files come first
    assert_eq!(
        child.files(&project).unwrap(),
        vec![
            temp.path().join("source/core/a.js"),
            temp.path().join("source/core/b.js"),
        ]
    );

    assert!(project.run().success());
    assert_eq!(
        read(temp.path(), "build/child-src.js"),
        "var a = 1;\n\nvar b = 2;"
    );
}

#[test]
fn test_own_directory_overrides_parent() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/core/a.js", "var a = 1;\n");
    write_file(temp.path(), "source/extras/b.js", "var b = 2;\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  src: {}

packages:
  base:
    directory: core
    files: [a.js]
  child:
    extends: base
    directory: extras
    files: [b.js]
"#;
    let project = build_project(temp.path(), yaml);
    let child = project.lookup("child").unwrap();
    assert_eq!(
        child.directory(&project).unwrap(),
        temp.path().join("source/extras")
    );
    assert!(project.run().success());
}

// ============================================================================
// Header Inheritance
// ============================================================================

#[test]
fn test_child_inherits_parent_header() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/core/h.js", "/* banner {{ build }} */\n");
    write_file(temp.path(), "source/core/a.js", "var a = 1;\n");
    write_file(temp.path(), "source/core/b.js", "var b = 2;\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  src: {}

packages:
  base:
    directory: core
    header: h.js
    files: [a.js]
  child:
    extends: base
    files: [b.js]
"#;
    let project = build_project(temp.path(), yaml);

    let child = project.lookup("child").unwrap();
    assert_eq!(
        child.effective_header(&project, "src").unwrap().as_deref(),
        Some("/* banner src */")
    );

    assert!(project.run().success());
    assert!(read(temp.path(), "build/child-src.js").starts_with("/* banner src */\n\n"));
}

#[test]
fn test_global_header_used_without_chain_header() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/COPYRIGHT.js", "/* (c) example */\n");
    write_file(temp.path(), "source/a.js", "var a = 1;\n");

    let yaml = r#"
source_directory: source
build_directory: build
header: COPYRIGHT.js

builds:
  src: {}

packages:
  app:
    files: [a.js]
"#;
    let project = build_project(temp.path(), yaml);
    assert!(project.run().success());
    assert_eq!(
        read(temp.path(), "build/app-src.js"),
        "/* (c) example */\n\nvar a = 1;"
    );
}

#[test]
fn test_header_survives_minification_as_banner() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/h.js", "/* keep me */\n");
    write_file(temp.path(), "source/a.js", "var a = 1; // drop me\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  min:
    shrink_vars: true

packages:
  app:
    header: h.js
    files: [a.js]
"#;
    let project = build_project(temp.path(), yaml);
    assert!(project.run().success());
    assert_eq!(
        read(temp.path(), "build/app-min.js"),
        "/* keep me */\nvar a = 1;"
    );
}

// ============================================================================
// Packer Setting Inheritance
// ============================================================================

#[test]
fn test_packer_false_disables_minification() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/a.js", "var a = 1; // kept\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  min:
    shrink_vars: true

packages:
  plain:
    files: [a.js]
    packer: false
  packed:
    files: [a.js]
"#;
    let project = build_project(temp.path(), yaml);

    let plain = project.lookup("plain").unwrap();
    assert_eq!(
        plain.effective_settings(&project, "min").unwrap(),
        Some(Emit::Raw)
    );

    assert!(project.run().success());
    assert_eq!(read(temp.path(), "build/plain-min.js"), "var a = 1; // kept");
    assert_eq!(read(temp.path(), "build/packed-min.js"), "var a = 1;");
}

#[test]
fn test_packer_false_is_inherited() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/a.js", "var a = 1; // kept\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  min:
    shrink_vars: true

packages:
  base:
    files: [a.js]
    packer: false
  child:
    extends: base
"#;
    let project = build_project(temp.path(), yaml);
    let child = project.lookup("child").unwrap();
    assert_eq!(
        child.effective_settings(&project, "min").unwrap(),
        Some(Emit::Raw)
    );
}

#[test]
fn test_own_record_beats_disabled_profile_settings() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/a.js", "var a = 1; // comment\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  min:
    minify: false

packages:
  regular:
    files: [a.js]
  special:
    files: [a.js]
    packer:
      minify: true
      mangle: true
"#;
    let project = build_project(temp.path(), yaml);

    // the profile record switches minification off for everyone else
    let regular = project.lookup("regular").unwrap();
    assert_eq!(
        regular.effective_settings(&project, "min").unwrap(),
        Some(Emit::Raw)
    );

    // the package's own record wins outright, unknown keys intact
    let special = project.lookup("special").unwrap();
    match special.effective_settings(&project, "min").unwrap() {
        Some(Emit::Minify(settings)) => {
            assert_eq!(settings.minify, Some(true));
            assert!(settings.extra.contains_key("mangle"));
        }
        other => panic!("expected the package's own settings, got {:?}", other),
    }

    assert!(project.run().success());
    assert_eq!(
        read(temp.path(), "build/regular-min.js"),
        "var a = 1; // comment"
    );
    assert_eq!(read(temp.path(), "build/special-min.js"), "var a = 1;");
}

#[test]
fn test_most_specific_override_beats_inherited_false() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/a.js", "var a = 1; // comment\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  min:
    shrink_vars: true

packages:
  base:
    files: [a.js]
    packer: false
  child:
    extends: base
    packer:
      shrink_vars: true
"#;
    let project = build_project(temp.path(), yaml);
    let child = project.lookup("child").unwrap();
    assert!(matches!(
        child.effective_settings(&project, "min").unwrap(),
        Some(Emit::Minify(_))
    ));

    assert!(project.run().success());
    assert_eq!(read(temp.path(), "build/child-min.js"), "var a = 1;");
}

#[test]
fn test_override_applies_to_every_profile() {
    // a target-level packer record packs even where the profile is raw
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "source/a.js", "var a = 1; // comment\n");

    let yaml = r#"
source_directory: source
build_directory: build

builds:
  src: {}

packages:
  eager:
    files: [a.js]
    packer:
      shrink_vars: true
"#;
    let project = build_project(temp.path(), yaml);
    assert!(project.run().success());
    assert_eq!(read(temp.path(), "build/eager-src.js"), "var a = 1;");
}
