//! Project initialization command (mortar init)

use anyhow::{bail, Context, Result};
use mortar_config::CONFIG_FILE;
use std::fs;
use std::path::Path;

/// Run the init command
pub fn run(directory: &Path) -> Result<()> {
    let config_path = directory.join(CONFIG_FILE);
    if config_path.exists() {
        bail!(
            "Project already initialized: {} exists at {}",
            CONFIG_FILE,
            config_path.display()
        );
    }

    fs::create_dir_all(directory.join("source"))
        .context("Failed to create source directory")?;
    fs::write(&config_path, starter_config()).context("Failed to write configuration")?;
    fs::write(directory.join("source/core.js"), starter_source())
        .context("Failed to write source stub")?;

    println!("Created {}", config_path.display());
    println!("\nTo get started:");
    println!("  mortar build {}", directory.display());
    Ok(())
}

/// Starter mortar.yml content
fn starter_config() -> &'static str {
    r#"source_directory: source
build_directory: build

builds:
  src: {}
  min:
    shrink_vars: true

packages:
  core:
    files: [core.js]

# bundles:
#   all:
#     files: [core]
"#
}

/// Starter source file content
fn starter_source() -> &'static str {
    "// core module\n\nvar core = {};\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_project() {
        let temp = TempDir::new().unwrap();
        run(temp.path()).unwrap();

        assert!(temp.path().join(CONFIG_FILE).is_file());
        assert!(temp.path().join("source/core.js").is_file());
    }

    #[test]
    fn test_init_refuses_existing_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "packages: {}\n").unwrap();

        assert!(run(temp.path()).is_err());
    }

    #[test]
    fn test_starter_config_parses() {
        use mortar_config::ProjectConfig;
        let config = ProjectConfig::from_yaml(starter_config(), Path::new(CONFIG_FILE));
        assert!(config.is_ok());
    }

    #[test]
    fn test_initialized_project_builds() {
        let temp = TempDir::new().unwrap();
        run(temp.path()).unwrap();

        let project = mortar_build::Project::from_directory(temp.path()).unwrap();
        let report = project.run();
        assert!(report.success());
        assert_eq!(report.written.len(), 2);
        assert!(temp.path().join("build/core-src.js").is_file());
        assert!(temp.path().join("build/core-min.js").is_file());
    }
}
