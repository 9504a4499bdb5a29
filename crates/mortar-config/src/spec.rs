//! Build profile and target specifications
//!
//! The YAML surface allows several shorthand shapes for a package or bundle
//! entry (a single file name, a bare file list, or a full record). All of
//! them are resolved into the one canonical [`TargetSpec`] during
//! deserialization, so nothing past the parser has to deal with shape
//! variants.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How generated files are arranged under the build directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// All profiles share one directory; filenames carry a profile suffix.
    #[default]
    Together,
    /// Each profile writes into its own subdirectory.
    Apart,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Together => write!(f, "together"),
            Self::Apart => write!(f, "apart"),
        }
    }
}

/// Minification settings handed to the packer.
///
/// All fields are optional; unrecognized keys are collected into `extra`
/// and passed through to the packer untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinifySettings {
    /// Master switch. `minify: false` emits the code untouched even when
    /// the rest of the record is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    /// Shorten local variable names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_vars: Option<bool>,

    /// Base-62 encode the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base62: Option<bool>,

    /// Obfuscate identifiers marked as private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,

    /// Emit a source map next to the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,

    /// Passthrough for packer options this tool does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl MinifySettings {
    /// True when no option at all has been set.
    pub fn is_empty(&self) -> bool {
        self.minify.is_none()
            && self.shrink_vars.is_none()
            && self.base62.is_none()
            && self.private.is_none()
            && self.source_map.is_none()
            && self.extra.is_empty()
    }

    /// Whether these settings actually ask for packing.
    pub fn wants_minify(&self) -> bool {
        self.minify.unwrap_or(true)
    }

    /// Whether a source map should accompany the artifact.
    pub fn wants_source_map(&self) -> bool {
        self.source_map.unwrap_or(false)
    }
}

/// A packer override on a target or inside a profile record.
///
/// `packer: false` switches packing off outright; a record supplies the
/// settings to pack with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackerSpec {
    Switch(bool),
    Settings(MinifySettings),
}

/// A named build profile as written in the `builds` section.
///
/// Three states: `false` disables the profile (no output), an empty record
/// (or `true`) emits raw concatenated source, and a settings record emits
/// minified output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSpec {
    Switch(bool),
    Config(ProfileConfig),
    /// A bare `profile:` key with no value; same as an empty record.
    Empty,
}

impl ProfileSpec {
    /// Whether this profile produces output at all.
    pub fn enabled(&self) -> bool {
        !matches!(self, Self::Switch(false))
    }

    /// Whether filenames for this profile carry the profile suffix.
    pub fn use_suffix(&self) -> bool {
        match self {
            Self::Config(config) => config.suffix != Some(false),
            Self::Switch(_) | Self::Empty => true,
        }
    }
}

/// The record form of a build profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// `suffix: false` drops the profile suffix from generated filenames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<bool>,

    /// Nested packer override; settings may also be given inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packer: Option<PackerSpec>,

    /// Inline minification settings (used when `packer` is absent).
    #[serde(flatten)]
    pub settings: MinifySettings,
}

/// Canonical package/bundle specification.
///
/// For a package, `files` lists source paths relative to the target's
/// directory; for a bundle it lists the names of the targets being
/// composed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TargetSpec {
    /// Source subdirectory; inherited from the `extends` parent if absent.
    pub directory: Option<PathBuf>,
    /// Ordered file paths (package) or member names (bundle).
    pub files: Vec<String>,
    /// Name of the parent spec to inherit directory/header/packer from.
    pub extends: Option<String>,
    /// Header file override, relative to the target's directory.
    pub header: Option<PathBuf>,
    /// Packer override; `false` disables minification for every profile.
    pub packer: Option<PackerSpec>,
    /// Opaque metadata, not interpreted by the build engine.
    pub meta: BTreeMap<String, serde_yaml::Value>,
}

impl TargetSpec {
    /// Spec consisting of a bare file list, as the shorthand forms produce.
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Shorthand shapes accepted for a target entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTargetSpec {
    Single(String),
    List(Vec<String>),
    Full(FullTargetSpec),
}

/// The full record shape, with strict field checking.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FullTargetSpec {
    directory: Option<PathBuf>,
    #[serde(default)]
    files: Vec<String>,
    extends: Option<String>,
    header: Option<PathBuf>,
    packer: Option<PackerSpec>,
    #[serde(default)]
    meta: BTreeMap<String, serde_yaml::Value>,
}

impl From<RawTargetSpec> for TargetSpec {
    fn from(raw: RawTargetSpec) -> Self {
        match raw {
            RawTargetSpec::Single(file) => TargetSpec::from_files([file]),
            RawTargetSpec::List(files) => TargetSpec::from_files(files),
            RawTargetSpec::Full(full) => TargetSpec {
                directory: full.directory,
                files: full.files,
                extends: full.extends,
                header: full.header,
                packer: full.packer,
                meta: full.meta,
            },
        }
    }
}

impl<'de> Deserialize<'de> for TargetSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTargetSpec::deserialize(deserializer).map(Into::into)
    }
}
