//! Shared behavior for buildable targets
//!
//! A target (package or bundle) resolves its directory, header, and
//! packer settings through its `extends` chain, computes one output path
//! per build profile, decides from file timestamps whether that output
//! needs regenerating, and writes itself out. The per-kind pieces
//! ([`files`](Buildable::files), [`source`](Buildable::source),
//! [`body`](Buildable::body)) are supplied by the implementations; the
//! rest is provided here.

use crate::error::{BuildError, BuildResult};
use crate::events::BuildEvent;
use crate::minify::PackRequest;
use crate::profile::Emit;
use crate::project::Project;
use mortar_config::{Layout, PackerSpec, TargetSpec};
use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension generated artifacts carry.
pub const OUTPUT_EXT: &str = "js";

/// Extension tried when a configured source path does not exist verbatim.
pub const SOURCE_EXT: &str = "js";

/// Kind of buildable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Backed directly by source files.
    Package,
    /// Composed of other targets by name.
    Bundle,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Bundle => write!(f, "bundle"),
        }
    }
}

/// What happened to one artifact during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The artifact (and possibly a source-map sibling) was written.
    Created {
        path: PathBuf,
        source_map: Option<PathBuf>,
    },
    /// The artifact was current, or its profile is disabled; the
    /// filesystem was not touched.
    Skipped { path: PathBuf },
}

/// Per-run memoization shared by both target kinds.
///
/// Entries are write-once: populated on first request and never
/// invalidated within a run, so repeated requests for the same
/// target+profile return identical bytes without recomputation.
#[derive(Debug, Default)]
pub struct CodeCache {
    source: OnceCell<String>,
    rendered: RefCell<BTreeMap<String, String>>,
    body: RefCell<BTreeMap<String, String>>,
}

impl CodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoize the raw source.
    pub fn source_memo(
        &self,
        init: impl FnOnce() -> BuildResult<String>,
    ) -> BuildResult<String> {
        if let Some(cached) = self.source.get() {
            return Ok(cached.clone());
        }
        let value = init()?;
        Ok(self.source.get_or_init(|| value).clone())
    }

    /// Memoize the template-evaluated source for one profile.
    pub fn rendered_memo(
        &self,
        profile: &str,
        init: impl FnOnce() -> BuildResult<String>,
    ) -> BuildResult<String> {
        Self::memo(&self.rendered, profile, init)
    }

    /// Memoize the artifact body for one profile.
    pub fn body_memo(
        &self,
        profile: &str,
        init: impl FnOnce() -> BuildResult<String>,
    ) -> BuildResult<String> {
        Self::memo(&self.body, profile, init)
    }

    fn memo(
        map: &RefCell<BTreeMap<String, String>>,
        key: &str,
        init: impl FnOnce() -> BuildResult<String>,
    ) -> BuildResult<String> {
        if let Some(cached) = map.borrow().get(key) {
            return Ok(cached.clone());
        }
        let value = init()?;
        map.borrow_mut().insert(key.to_string(), value.clone());
        Ok(value)
    }
}

/// A named target that resolves to one output artifact per build profile.
pub trait Buildable {
    fn name(&self) -> &str;
    fn kind(&self) -> TargetKind;
    fn spec(&self) -> &TargetSpec;
    fn cache(&self) -> &CodeCache;

    /// Every file this target's artifact is generated from, in order.
    /// Missing files are an error here, not later.
    fn files(&self, project: &Project) -> BuildResult<Vec<PathBuf>>;

    /// Raw concatenated source, before template evaluation. Memoized for
    /// the run.
    fn source(&self, project: &Project) -> BuildResult<String>;

    /// Artifact body for one profile, without the header. Memoized per
    /// profile for the run.
    fn body(&self, project: &Project, profile: &str) -> BuildResult<String>;

    /// The `extends` parent, if any. Unresolvable names are an error, never
    /// a silent no-parent fallback.
    fn parent<'p>(&self, project: &'p Project) -> BuildResult<Option<&'p dyn Buildable>> {
        match self.spec().extends.as_deref() {
            None => Ok(None),
            Some(parent) => project
                .lookup(parent)
                .map(Some)
                .ok_or_else(|| BuildError::unknown_target(parent, self.name())),
        }
    }

    /// Source directory: own, or inherited through the `extends` chain, or
    /// the project source directory.
    fn directory(&self, project: &Project) -> BuildResult<PathBuf> {
        if let Some(dir) = &self.spec().directory {
            return Ok(project.source_directory().join(dir));
        }
        match self.parent(project)? {
            Some(parent) => parent.directory(project),
            None => Ok(project.source_directory()),
        }
    }

    /// Output path for one profile. A pure function of target name, profile
    /// name, layout, and the profile's suffix flag.
    fn output_path(&self, project: &Project, profile: &str) -> PathBuf {
        match project.layout() {
            Layout::Together => {
                let suffix = if project.use_suffix(profile) {
                    format!("-{profile}")
                } else {
                    String::new()
                };
                project
                    .build_directory()
                    .join(format!("{}{}.{}", self.name(), suffix, OUTPUT_EXT))
            }
            Layout::Apart => project
                .build_directory()
                .join(profile)
                .join(format!("{}.{}", self.name(), OUTPUT_EXT)),
        }
    }

    /// Path of the header file governing this target, if any, resolved
    /// through the `extends` chain down to the project's global header.
    fn header_path(&self, project: &Project) -> BuildResult<Option<PathBuf>> {
        if let Some(header) = &self.spec().header {
            return Ok(Some(self.directory(project)?.join(header)));
        }
        match self.parent(project)? {
            Some(parent) => parent.header_path(project),
            None => Ok(project.global_header_path()),
        }
    }

    /// Header banner, template-evaluated and trimmed. `None` when no header
    /// is configured anywhere along the chain.
    fn effective_header(&self, project: &Project, profile: &str) -> BuildResult<Option<String>> {
        let Some(path) = self.header_path(project)? else {
            return Ok(None);
        };
        let Some(raw) = read_source(&path)? else {
            return Err(BuildError::missing_source(self.name(), &path));
        };
        let rendered = project
            .engine()
            .evaluate(&raw, &project.scope_for(profile))?;
        let trimmed = rendered.trim();
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        })
    }

    /// Packer override resolved through the `extends` chain. The most
    /// specific value wins; `None` means no level overrides the profile.
    fn chain_packer(&self, project: &Project) -> BuildResult<Option<PackerSpec>> {
        if let Some(packer) = &self.spec().packer {
            return Ok(Some(packer.clone()));
        }
        match self.parent(project)? {
            Some(parent) => parent.chain_packer(project),
            None => Ok(None),
        }
    }

    /// Emit mode for one profile: `None` when the profile is disabled
    /// project-wide (no output), otherwise the profile's mode unless this
    /// target or its chain overrides it.
    fn effective_settings(&self, project: &Project, profile: &str) -> BuildResult<Option<Emit>> {
        let Some(profile_emit) = project.profile_settings(profile) else {
            return Ok(None);
        };
        match self.chain_packer(project)? {
            Some(packer) => Ok(Some(Emit::from_packer(&packer))),
            None => Ok(Some(profile_emit)),
        }
    }

    /// Whether the artifact for one profile needs regenerating: forced
    /// rebuild, missing output, or any transitive input newer than it.
    fn is_stale(&self, project: &Project, profile: &str) -> BuildResult<bool> {
        if project.forced() {
            return Ok(true);
        }
        let path = self.output_path(project, profile);
        let Ok(metadata) = fs::metadata(&path) else {
            return Ok(true);
        };
        let built = metadata.modified().map_err(|e| BuildError::io_at(&path, e))?;

        let mut inputs = self.files(project)?;
        inputs.extend(project.config_paths().iter().cloned());
        if let Some(header) = self.header_path(project)? {
            if let Some(resolved) = resolve_source(&header) {
                inputs.push(resolved);
            }
        }

        for input in inputs {
            if modified_time(&input)? > built {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Template-evaluated source for one profile, memoized per run.
    fn rendered(&self, project: &Project, profile: &str) -> BuildResult<String> {
        self.cache().rendered_memo(profile, || {
            let source = self.source(project)?;
            project.engine().evaluate(&source, &project.scope_for(profile))
        })
    }

    /// Produce (or skip) the artifact for one profile.
    ///
    /// Disabled profiles and up-to-date outputs return a skipped outcome
    /// without touching the filesystem. Otherwise the artifact content is
    /// computed and written, together with a source-map sibling when the
    /// settings request one. The header is applied exactly once, inside
    /// the packer request when minifying.
    fn materialize(&self, project: &Project, profile: &str) -> BuildResult<WriteOutcome> {
        let path = self.output_path(project, profile);

        let Some(emit) = self.effective_settings(project, profile)? else {
            project.events().fire(&BuildEvent::file_not_changed(
                self.name(),
                self.kind(),
                profile,
                &path,
            ));
            return Ok(WriteOutcome::Skipped { path });
        };

        if !self.is_stale(project, profile)? {
            project.events().fire(&BuildEvent::file_not_changed(
                self.name(),
                self.kind(),
                profile,
                &path,
            ));
            return Ok(WriteOutcome::Skipped { path });
        }

        let header = self.effective_header(project, profile)?;
        let (content, map_payload) = match emit {
            Emit::Raw => {
                let body = self.body(project, profile)?;
                let content = match &header {
                    Some(banner) => format!("{banner}\n\n{body}"),
                    None => body,
                };
                (content.trim().to_string(), None)
            }
            Emit::Minify(settings) => {
                let rendered = self.rendered(project, profile)?;
                let sources = self.files(project)?;
                let request = PackRequest {
                    settings: &settings,
                    header: header.as_deref(),
                    output_path: Some(&path),
                    sources: &sources,
                };
                let output = project
                    .minifier()
                    .minify(&rendered, &request)
                    .map_err(|e| BuildError::minify(self.name(), profile, e))?;
                (output.code, output.source_map)
            }
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| BuildError::io_at(dir, e))?;
        }
        fs::write(&path, content.as_bytes()).map_err(|e| BuildError::io_at(&path, e))?;

        let source_map = match map_payload {
            Some(payload) => {
                let sibling = source_map_path(&path);
                fs::write(&sibling, payload.as_bytes())
                    .map_err(|e| BuildError::io_at(&sibling, e))?;
                Some(sibling)
            }
            None => None,
        };

        project.events().fire(&BuildEvent::file_created(
            self.name(),
            self.kind(),
            profile,
            &path,
        ));
        Ok(WriteOutcome::Created { path, source_map })
    }
}

/// Resolve a configured source path, trying the conventional extension when
/// the verbatim path is missing.
pub(crate) fn resolve_source(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let mut with_ext = path.as_os_str().to_owned();
    with_ext.push(".");
    with_ext.push(SOURCE_EXT);
    let with_ext = PathBuf::from(with_ext);
    with_ext.is_file().then_some(with_ext)
}

/// Read a source file with the extension fallback, trimming the content.
/// `Ok(None)` means the file does not exist under either name.
pub(crate) fn read_source(path: &Path) -> BuildResult<Option<String>> {
    let Some(resolved) = resolve_source(path) else {
        return Ok(None);
    };
    let content =
        fs::read_to_string(&resolved).map_err(|e| BuildError::io_at(&resolved, e))?;
    Ok(Some(content.trim().to_string()))
}

/// Modification time of an input file.
fn modified_time(path: &Path) -> BuildResult<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| BuildError::io_at(path, e))
}

/// Source-map sibling path: the artifact path with `.map` appended.
pub(crate) fn source_map_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".map");
    PathBuf::from(os)
}
