//! Configuration discovery
//!
//! Finds `mortar.yml` by walking up from a starting directory, the same way
//! build tools locate their manifest from anywhere inside a project tree.

use crate::project::ProjectConfig;
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Name of the configuration file searched for.
pub const CONFIG_FILE: &str = "mortar.yml";

/// Configuration loader
pub struct ConfigLoader;

/// A loaded configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed project configuration.
    pub project: ProjectConfig,
    /// Directory containing the configuration file.
    pub project_root: PathBuf,
    /// Path of the configuration file itself.
    pub config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory, walking up the
    /// directory tree until a `mortar.yml` is found.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.is_file() {
                return self.load_from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(ConfigError::NotFound(start_dir.join(CONFIG_FILE))),
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Config {
            project,
            project_root,
            config_path: config_path.to_path_buf(),
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
