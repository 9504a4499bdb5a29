//! Build profile resolution
//!
//! A declared profile resolves to one of three states: disabled (no
//! artifact at all), raw concatenated output, or minified output with a
//! settings record. Targets can override the profile's packing decision
//! through their `packer` field, resolved along the `extends` chain with
//! the most specific complete value winning; records never merge
//! field-by-field across levels.

use mortar_config::{MinifySettings, PackerSpec, ProfileSpec};
use std::collections::BTreeMap;

/// How an artifact is emitted for one profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    /// Concatenated source, written as-is.
    Raw,
    /// Packed with the given settings.
    Minify(MinifySettings),
}

impl Emit {
    /// Whether this mode runs the minifier.
    pub fn is_minified(&self) -> bool {
        matches!(self, Self::Minify(_))
    }

    /// The settings record, when packing.
    pub fn settings(&self) -> Option<&MinifySettings> {
        match self {
            Self::Minify(settings) => Some(settings),
            Self::Raw => None,
        }
    }

    /// Emit mode described by a bare settings record. A record switched off
    /// with `minify: false` emits raw.
    pub fn from_settings(settings: MinifySettings) -> Self {
        if settings.wants_minify() {
            Self::Minify(settings)
        } else {
            Self::Raw
        }
    }

    /// Emit mode described by a packer override.
    pub fn from_packer(spec: &PackerSpec) -> Self {
        match spec {
            PackerSpec::Switch(false) => Self::Raw,
            PackerSpec::Switch(true) => Self::Minify(MinifySettings::default()),
            PackerSpec::Settings(settings) => Self::from_settings(settings.clone()),
        }
    }
}

/// A resolved entry in the coordinator's profile table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    /// `None` when the profile is disabled and produces no output.
    pub emit: Option<Emit>,
    /// Whether filenames carry the `-<profile>` suffix under the
    /// `together` layout.
    pub suffix: bool,
}

/// Resolve one declared profile.
pub fn resolve_profile(spec: &ProfileSpec) -> ProfileEntry {
    let suffix = spec.use_suffix();
    let emit = match spec {
        ProfileSpec::Switch(false) => None,
        ProfileSpec::Switch(true) | ProfileSpec::Empty => Some(Emit::Raw),
        ProfileSpec::Config(config) => Some(match &config.packer {
            Some(packer) => Emit::from_packer(packer),
            None if config.settings.is_empty() => Emit::Raw,
            None => Emit::from_settings(config.settings.clone()),
        }),
    };
    ProfileEntry { emit, suffix }
}

/// Profile table used when the configuration declares no `builds` section:
/// a raw `src` profile plus a `min` profile packing with the global
/// settings.
pub fn default_profiles(global: Option<&MinifySettings>) -> BTreeMap<String, ProfileEntry> {
    let mut table = BTreeMap::new();
    table.insert(
        "src".to_string(),
        ProfileEntry {
            emit: Some(Emit::Raw),
            suffix: true,
        },
    );
    table.insert(
        "min".to_string(),
        ProfileEntry {
            emit: Some(Emit::from_settings(global.cloned().unwrap_or_default())),
            suffix: true,
        },
    );
    table
}
