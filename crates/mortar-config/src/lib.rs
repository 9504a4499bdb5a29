//! Mortar configuration system
//!
//! Provides the `mortar.yml` schema and loading for mortar projects:
//! - Project configuration (directories, layout, header, packer defaults)
//! - Named build profiles (`builds`)
//! - Package and bundle specifications, normalized to one canonical record
//! - Walk-up discovery of the configuration file from a starting directory
//!
//! # Example
//!
//! ```no_run
//! use mortar_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! ```

pub mod loader;
pub mod project;
pub mod spec;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML syntax in {file}: {error}")]
    YamlParseError {
        file: PathBuf,
        error: serde_yaml::Error,
    },

    #[error("Missing required section '{section}' in {file}")]
    MissingSection { section: String, file: PathBuf },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, CONFIG_FILE};
pub use project::ProjectConfig;
pub use spec::{Layout, MinifySettings, PackerSpec, ProfileConfig, ProfileSpec, TargetSpec};
