//! Packages: targets backed directly by source files

use crate::buildable::{resolve_source, Buildable, CodeCache, TargetKind};
use crate::error::{BuildError, BuildResult};
use crate::minify::PackRequest;
use crate::profile::Emit;
use crate::project::Project;
use mortar_config::TargetSpec;
use std::fs;
use std::path::PathBuf;

/// A group of source files built into one artifact per profile.
pub struct Package {
    name: String,
    spec: TargetSpec,
    cache: CodeCache,
}

impl Package {
    pub(crate) fn new(name: impl Into<String>, spec: TargetSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            cache: CodeCache::new(),
        }
    }
}

impl Buildable for Package {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Package
    }

    fn spec(&self) -> &TargetSpec {
        &self.spec
    }

    fn cache(&self) -> &CodeCache {
        &self.cache
    }

    /// Parent files first, then this package's own list, each resolved
    /// against the package directory with the extension fallback.
    fn files(&self, project: &Project) -> BuildResult<Vec<PathBuf>> {
        let mut files = match self.parent(project)? {
            Some(parent) => parent.files(project)?,
            None => Vec::new(),
        };

        let directory = self.directory(project)?;
        for file in &self.spec.files {
            let path = directory.join(file);
            let resolved = resolve_source(&path)
                .ok_or_else(|| BuildError::missing_source(&self.name, &path))?;
            files.push(resolved);
        }
        Ok(files)
    }

    /// Raw concatenation of the package files, blank-line separated, with
    /// no templating applied.
    fn source(&self, project: &Project) -> BuildResult<String> {
        self.cache.source_memo(|| {
            let mut parts = Vec::new();
            for path in self.files(project)? {
                let content =
                    fs::read_to_string(&path).map_err(|e| BuildError::io_at(&path, e))?;
                parts.push(content.trim().to_string());
            }
            Ok(parts.join("\n\n"))
        })
    }

    /// Template-evaluated source, minified when the resolved settings for
    /// the profile say so. Headers are not applied here; they belong to the
    /// artifact, not the fragment.
    fn body(&self, project: &Project, profile: &str) -> BuildResult<String> {
        self.cache.body_memo(profile, || {
            let rendered = self.rendered(project, profile)?;
            match self.effective_settings(project, profile)?.unwrap_or(Emit::Raw) {
                Emit::Raw => Ok(rendered),
                Emit::Minify(settings) => {
                    let sources = self.files(project)?;
                    let request = PackRequest {
                        settings: &settings,
                        header: None,
                        output_path: None,
                        sources: &sources,
                    };
                    project
                        .minifier()
                        .minify(&rendered, &request)
                        .map(|output| output.code)
                        .map_err(|e| BuildError::minify(&self.name, profile, e))
                }
            }
        })
    }
}
