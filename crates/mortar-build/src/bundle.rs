//! Bundles: targets composed of other targets by name
//!
//! A bundle's member list names packages or other bundles; names resolve
//! lazily through the coordinator, so members need not be constructed
//! before the bundle is. Staleness is transitive: every file of every
//! referenced target counts as an input.

use crate::buildable::{Buildable, CodeCache, TargetKind};
use crate::error::{BuildError, BuildResult};
use crate::minify::PackRequest;
use crate::profile::Emit;
use crate::project::Project;
use mortar_config::TargetSpec;
use std::path::PathBuf;

/// A composition of other targets, built into one artifact per profile.
pub struct Bundle {
    name: String,
    spec: TargetSpec,
    cache: CodeCache,
}

impl Bundle {
    pub(crate) fn new(name: impl Into<String>, spec: TargetSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            cache: CodeCache::new(),
        }
    }

    /// Member targets, in configured order.
    fn members<'p>(&self, project: &'p Project) -> BuildResult<Vec<&'p dyn Buildable>> {
        self.spec
            .files
            .iter()
            .map(|member| {
                project
                    .lookup(member)
                    .ok_or_else(|| BuildError::unknown_member(&self.name, member))
            })
            .collect()
    }
}

impl Buildable for Bundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Bundle
    }

    fn spec(&self) -> &TargetSpec {
        &self.spec
    }

    fn cache(&self) -> &CodeCache {
        &self.cache
    }

    /// Parent files first, then every member's files in member order.
    fn files(&self, project: &Project) -> BuildResult<Vec<PathBuf>> {
        let mut files = match self.parent(project)? {
            Some(parent) => parent.files(project)?,
            None => Vec::new(),
        };
        for member in self.members(project)? {
            files.extend(member.files(project)?);
        }
        Ok(files)
    }

    /// Members' raw source in member order, blank-line separated.
    fn source(&self, project: &Project) -> BuildResult<String> {
        self.cache.source_memo(|| {
            let mut parts = Vec::new();
            for member in self.members(project)? {
                parts.push(member.source(project)?);
            }
            Ok(parts.join("\n\n"))
        })
    }

    /// For a raw profile, the members' own per-profile code (each already
    /// minified or raw per its own settings, headers excluded) joined with
    /// a blank line so packed fragments never run together. For a minified
    /// profile, the joined raw source is template-evaluated once and packed
    /// as a single unit.
    fn body(&self, project: &Project, profile: &str) -> BuildResult<String> {
        self.cache.body_memo(profile, || {
            match self.effective_settings(project, profile)?.unwrap_or(Emit::Raw) {
                Emit::Raw => {
                    let mut parts = Vec::new();
                    for member in self.members(project)? {
                        parts.push(member.body(project, profile)?);
                    }
                    Ok(parts.join("\n\n"))
                }
                Emit::Minify(settings) => {
                    let rendered = self.rendered(project, profile)?;
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
