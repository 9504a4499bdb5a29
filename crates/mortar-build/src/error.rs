/// Build engine error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown target '{name}' referenced by '{referrer}'")]
    UnknownTarget { name: String, referrer: String },

    #[error("Cyclic 'extends' chain: {chain}")]
    ExtendsCycle { chain: String },

    #[error("Cyclic bundle membership: {chain}")]
    MemberCycle { chain: String },

    #[error("Bundle '{bundle}' references unknown member '{member}'")]
    UnknownMember { bundle: String, member: String },

    #[error("Missing source file for '{target}': {path}")]
    MissingSource { target: String, path: PathBuf },

    #[error("Minification failed for '{target}' ({profile}): {reason}")]
    MinifyError {
        target: String,
        profile: String,
        reason: String,
    },

    #[error("packer: {0}")]
    Packer(String),

    #[error("Template evaluation failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(#[from] mortar_config::ConfigError),

    #[error("I/O error at {path}: {error}")]
    IoAt {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Create an unknown-target error
    pub fn unknown_target(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self::UnknownTarget {
            name: name.into(),
            referrer: referrer.into(),
        }
    }

    /// Create an extends-cycle error from the chain walked so far
    pub fn extends_cycle(chain: &[String]) -> Self {
        Self::ExtendsCycle {
            chain: chain.join(" -> "),
        }
    }

    /// Create a member-cycle error from the membership path walked so far
    pub fn member_cycle(chain: &[String]) -> Self {
        Self::MemberCycle {
            chain: chain.join(" -> "),
        }
    }

    /// Create an unknown-member error
    pub fn unknown_member(bundle: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            bundle: bundle.into(),
            member: member.into(),
        }
    }

    /// Create a missing-source error
    pub fn missing_source(target: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingSource {
            target: target.into(),
            path: path.into(),
        }
    }

    /// Create a minification error with target and profile context
    pub fn minify(
        target: impl Into<String>,
        profile: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::MinifyError {
            target: target.into(),
            profile: profile.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an I/O error with path context
    pub fn io_at(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            error,
        }
    }
}
