//! Project configuration (`mortar.yml`)
//!
//! The top-level mapping read from the project's `mortar.yml`.

use crate::spec::{Layout, MinifySettings, ProfileSpec, TargetSpec};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project configuration from `mortar.yml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory source files are read from, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<PathBuf>,

    /// Directory generated files are written to, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_directory: Option<PathBuf>,

    /// File layout for generated artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Shared header file, relative to the source directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PathBuf>,

    /// Global packer settings, used by the default `min` profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packer: Option<MinifySettings>,

    /// Named build profiles. When absent the engine supplies
    /// `{src: raw, min: <global packer settings>}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub builds: BTreeMap<String, ProfileSpec>,

    /// Named packages (groups of source files). Mandatory.
    #[serde(default)]
    pub packages: BTreeMap<String, TargetSpec>,

    /// Named bundles (compositions of packages and other bundles).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, TargetSpec>,
}

impl ProjectConfig {
    /// Load and validate a configuration file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;
        Self::from_yaml(&content, path)
    }

    /// Parse and validate configuration text. `origin` is the path used in
    /// error messages.
    pub fn from_yaml(content: &str, origin: &Path) -> ConfigResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParseError {
                file: origin.to_path_buf(),
                error: e,
            })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self, origin: &Path) -> ConfigResult<()> {
        if self.packages.is_empty() {
            return Err(ConfigError::MissingSection {
                section: "packages".to_string(),
                file: origin.to_path_buf(),
            });
        }

        for name in self.packages.keys().chain(self.bundles.keys()) {
            if name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "packages/bundles".to_string(),
                    reason: "target names cannot be empty".to_string(),
                });
            }
        }

        for (name, spec) in &self.bundles {
            if spec.files.is_empty() && spec.extends.is_none() {
                return Err(ConfigError::InvalidValue {
                    field: format!("bundles.{}", name),
                    reason: "a bundle must list member names or extend another bundle"
                        .to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> ConfigResult<ProjectConfig> {
        ProjectConfig::from_yaml(yaml, Path::new("mortar.yml"))
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("packages:\n  core: [core.js]\n").unwrap();
        assert_eq!(config.packages.len(), 1);
        assert!(config.bundles.is_empty());
        assert!(config.builds.is_empty());
        assert_eq!(config.layout, None);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
source_directory: source
build_directory: build
layout: apart
header: COPYRIGHT
packer:
  shrink_vars: true

builds:
  src: {}
  min:
    shrink_vars: true
    source_map: true
  dist: false

packages:
  core:
    directory: core
    files: [core, utils]
  goodies:
    extends: core
    files: [extras]

bundles:
  all:
    files: [core, goodies]
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.source_directory, Some(PathBuf::from("source")));
        assert_eq!(config.build_directory, Some(PathBuf::from("build")));
        assert_eq!(config.layout, Some(Layout::Apart));
        assert_eq!(config.builds.len(), 3);
        assert!(!config.builds["dist"].enabled());
        assert_eq!(config.packages["goodies"].extends.as_deref(), Some("core"));
        assert_eq!(config.bundles["all"].files, vec!["core", "goodies"]);
    }

    #[test]
    fn test_missing_packages_section() {
        let err = parse("builds:\n  src: {}\n").unwrap_err();
        match err {
            ConfigError::MissingSection { section, .. } => assert_eq!(section, "packages"),
            other => panic!("expected MissingSection, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_bundle_rejected() {
        let yaml = "packages:\n  core: [core.js]\nbundles:\n  all: []\n";
        assert!(matches!(
            parse(yaml),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let err = parse("pakcages:\n  core: [core.js]\n").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParseError { .. }));
    }
}
