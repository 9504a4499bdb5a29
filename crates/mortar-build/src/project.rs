//! Build coordination
//!
//! A [`Project`] owns the target registries (packages first, then bundles,
//! since bundles reference other targets by name), the resolved profile
//! table, the event bus, and the template/minifier seams. Construction
//! validates every `extends` chain and member reference before anything is
//! written; [`Project::run`] then materializes every target for every
//! profile, collecting per-artifact failures instead of aborting on them.

use crate::buildable::{Buildable, WriteOutcome};
use crate::bundle::Bundle;
use crate::error::{BuildError, BuildResult};
use crate::events::{BuildEvent, EventBus};
use crate::minify::{Minifier, StripMinifier};
use crate::package::Package;
use crate::profile::{default_profiles, resolve_profile, Emit, ProfileEntry};
use crate::template::{HelperScope, PlaceholderEngine, TemplateEngine};
use mortar_config::{ConfigError, ConfigLoader, Layout, ProjectConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The coordinator for one build run.
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    config_paths: Vec<PathBuf>,
    packages: BTreeMap<String, Package>,
    bundles: BTreeMap<String, Bundle>,
    profiles: BTreeMap<String, ProfileEntry>,
    forced: bool,
    events: EventBus,
    engine: Box<dyn TemplateEngine>,
    minifier: Box<dyn Minifier>,
    scope: HelperScope,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("config_paths", &self.config_paths)
            .field("forced", &self.forced)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Build a project from an already-parsed configuration. Validates the
    /// target graph; a bad `extends` or member reference fails here, before
    /// any file is written.
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> BuildResult<Self> {
        let root = root.into();

        let packages = config
            .packages
            .iter()
            .map(|(name, spec)| (name.clone(), Package::new(name, spec.clone())))
            .collect();
        let bundles = config
            .bundles
            .iter()
            .map(|(name, spec)| (name.clone(), Bundle::new(name, spec.clone())))
            .collect();

        let profiles = if config.builds.is_empty() {
            default_profiles(config.packer.as_ref())
        } else {
            config
                .builds
                .iter()
                .map(|(name, spec)| (name.clone(), resolve_profile(spec)))
                .collect()
        };

        let project = Self {
            root,
            config_paths: Vec::new(),
            packages,
            bundles,
            profiles,
            forced: false,
            events: EventBus::new(),
            engine: Box::new(PlaceholderEngine),
            minifier: Box::new(StripMinifier),
            scope: HelperScope::default(),
            config,
        };
        project.validate()?;
        Ok(project)
    }

    /// Discover `mortar.yml` upward from the given directory and build a
    /// project from it. The configuration file is tracked as a staleness
    /// input for every artifact.
    pub fn from_directory(dir: impl AsRef<Path>) -> BuildResult<Self> {
        let config = ConfigLoader::new().load_from_directory(dir.as_ref())?;
        let mut project = Self::new(config.project_root, config.project)?;
        project.config_paths.push(config.config_path);
        Ok(project)
    }

    /// Track an additional configuration file as a staleness input.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    /// Replace the template engine.
    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Replace the minifier.
    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Box::new(minifier);
        self
    }

    /// Replace the helper scope templates are evaluated against.
    pub fn with_scope(mut self, scope: HelperScope) -> Self {
        self.scope = scope;
        self
    }

    /// Regenerate every artifact regardless of timestamps.
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// Whether this is a forced build.
    pub fn forced(&self) -> bool {
        self.forced
    }

    /// Register a listener for build lifecycle events.
    pub fn subscribe(&mut self, listener: impl Fn(&BuildEvent) + 'static) {
        self.events.subscribe(listener);
    }

    /// The target with the given name; packages shadow bundles.
    pub fn lookup(&self, name: &str) -> Option<&dyn Buildable> {
        if let Some(package) = self.packages.get(name) {
            return Some(package);
        }
        self.bundles.get(name).map(|bundle| bundle as &dyn Buildable)
    }

    /// Every target: packages first, then bundles, each in name order.
    pub fn targets(&self) -> impl Iterator<Item = &dyn Buildable> {
        self.packages
            .values()
            .map(|package| package as &dyn Buildable)
            .chain(self.bundles.values().map(|bundle| bundle as &dyn Buildable))
    }

    /// Declared profile names, in the order they are built.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Absolute source directory.
    pub fn source_directory(&self) -> PathBuf {
        match &self.config.source_directory {
            Some(dir) => self.root.join(dir),
            None => self.root.clone(),
        }
    }

    /// Absolute build directory.
    pub fn build_directory(&self) -> PathBuf {
        match &self.config.build_directory {
            Some(dir) => self.root.join(dir),
            None => self.root.clone(),
        }
    }

    /// File layout for generated artifacts.
    pub fn layout(&self) -> Layout {
        self.config.layout.unwrap_or_default()
    }

    /// Emit mode for a profile; `None` when the profile is disabled (or
    /// undeclared).
    pub fn profile_settings(&self, profile: &str) -> Option<Emit> {
        self.profiles.get(profile).and_then(|entry| entry.emit.clone())
    }

    /// Whether filenames for a profile carry the profile suffix.
    pub fn use_suffix(&self, profile: &str) -> bool {
        self.profiles
            .get(profile)
            .map(|entry| entry.suffix)
            .unwrap_or(true)
    }

    /// Path of the project-wide header file, if configured.
    pub fn global_header_path(&self) -> Option<PathBuf> {
        self.config
            .header
            .as_ref()
            .map(|header| self.source_directory().join(header))
    }

    /// Configuration files participating in every staleness check.
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }

    pub(crate) fn engine(&self) -> &dyn TemplateEngine {
        self.engine.as_ref()
    }

    pub(crate) fn minifier(&self) -> &dyn Minifier {
        self.minifier.as_ref()
    }

    /// The helper scope for one profile: the run's scope with the profile
    /// name exposed as `build`.
    pub(crate) fn scope_for(&self, profile: &str) -> HelperScope {
        self.scope.clone().with_var("build", profile)
    }

    /// Run the build: every target, every profile, in declared order.
    /// Per-artifact failures are collected in the report; fires
    /// `BuildComplete` once at the end.
    pub fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        for target in self.targets() {
            for profile in self.profiles.keys() {
                match target.materialize(self, profile) {
                    Ok(WriteOutcome::Created { path, source_map }) => {
                        report.written.push(ArtifactRecord {
                            target: target.name().to_string(),
                            profile: profile.clone(),
                            path,
                            source_map,
                        });
                    }
                    Ok(WriteOutcome::Skipped { path }) => {
                        report.skipped.push(ArtifactRecord {
                            target: target.name().to_string(),
                            profile: profile.clone(),
                            path,
                            source_map: None,
                        });
                    }
                    Err(error) => {
                        report.failures.push(FailureRecord {
                            target: target.name().to_string(),
                            profile: profile.clone(),
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        self.events.fire(&BuildEvent::BuildComplete);
        report
    }

    /// Walk every `extends` chain and member reference. Runs once at
    /// construction so that bad names and cycles surface before any write.
    fn validate(&self) -> BuildResult<()> {
        if self.packages.is_empty() {
            return Err(BuildError::Config(ConfigError::MissingSection {
                section: "packages".to_string(),
                file: self.root.join(mortar_config::CONFIG_FILE),
            }));
        }

        for target in self.targets() {
            let mut chain = vec![target.name().to_string()];
            let mut referrer = target.name().to_string();
            let mut current = target.spec().extends.clone();

            while let Some(parent) = current {
                if chain.contains(&parent) {
                    chain.push(parent);
                    return Err(BuildError::extends_cycle(&chain));
                }
                let next = self
                    .lookup(&parent)
                    .ok_or_else(|| BuildError::unknown_target(&parent, &referrer))?;
                chain.push(parent.clone());
                referrer = parent;
                current = next.spec().extends.clone();
            }
        }

        for (name, bundle) in &self.bundles {
            for member in &bundle.spec().files {
                if self.lookup(member).is_none() {
                    return Err(BuildError::unknown_member(name, member));
                }
            }
        }

        for name in self.bundles.keys() {
            let mut path = Vec::new();
            self.walk_members(name, &mut path)?;
        }

        Ok(())
    }

    /// Depth-first walk over bundle membership (and bundle `extends`
    /// edges, which also pull in files) to catch reference cycles.
    fn walk_members(&self, name: &str, path: &mut Vec<String>) -> BuildResult<()> {
        if path.iter().any(|seen| seen == name) {
            path.push(name.to_string());
            return Err(BuildError::member_cycle(path));
        }
        let Some(bundle) = self.bundles.get(name) else {
            // packages terminate the walk
            return Ok(());
        };

        path.push(name.to_string());
        let spec = bundle.spec();
        for next in spec.files.iter().chain(spec.extends.iter()) {
            self.walk_members(next, path)?;
        }
        path.pop();
        Ok(())
    }
}

/// What one run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Artifacts written this run.
    pub written: Vec<ArtifactRecord>,
    /// Artifacts that were current or disabled; nothing was touched.
    pub skipped: Vec<ArtifactRecord>,
    /// Artifacts that failed; the rest of the run still completed.
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    /// True when no artifact failed.
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One written or skipped artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
    pub target: String,
    pub profile: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<PathBuf>,
}

/// One failed artifact.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub target: String,
    pub profile: String,
    pub error: String,
}
