//! Mortar build engine
//!
//! Turns named groups of source files ("packages") and compositions of
//! those groups ("bundles") into generated artifacts, one per named build
//! profile. Provides:
//! - Target registries with `extends` inheritance and lazy name resolution
//! - Timestamp-based staleness detection per artifact
//! - Per-profile minification settings with most-specific-wins overrides
//! - Artifact generation: concatenation, templating, optional minification,
//!   optional source maps, shared headers
//! - `together`/`apart` output layouts with profile suffixing
//! - Lifecycle events over a per-run event bus

pub mod buildable;
pub mod bundle;
pub mod error;
pub mod events;
pub mod minify;
pub mod package;
pub mod profile;
pub mod project;
pub mod template;

// Re-export main types
pub use buildable::{Buildable, CodeCache, TargetKind, WriteOutcome, OUTPUT_EXT, SOURCE_EXT};
pub use bundle::Bundle;
pub use error::{BuildError, BuildResult};
pub use events::{BuildEvent, EventBus};
pub use minify::{Minifier, MinifyOutput, PackRequest, StripMinifier};
pub use package::Package;
pub use profile::{default_profiles, resolve_profile, Emit, ProfileEntry};
pub use project::{ArtifactRecord, FailureRecord, Project, RunReport};
pub use template::{Helper, HelperScope, PlaceholderEngine, TemplateEngine};

// Re-export configuration types for convenience
pub use mortar_config::{Layout, MinifySettings, PackerSpec, ProfileSpec, ProjectConfig, TargetSpec};
