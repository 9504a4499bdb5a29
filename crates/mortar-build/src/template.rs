//! Template evaluation seam
//!
//! Source and header text may contain `{{ name }}` placeholders that are
//! filled in from a [`HelperScope`] when an artifact is generated. The scope
//! holds plain string variables plus a registry of named helper functions,
//! both populated before a run starts. The coordinator exposes the current
//! profile name to templates as the `build` variable.
//!
//! Evaluation is behind the [`TemplateEngine`] trait so a richer engine can
//! be swapped in; the built-in [`PlaceholderEngine`] does substitution only
//! and is not a templating language.

use crate::error::BuildResult;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A helper callable from templates. Helpers see the scope they were
/// resolved from, so they can read its variables.
pub type Helper = Rc<dyn Fn(&HelperScope) -> String>;

/// Variables and helpers available to templates during one run.
#[derive(Clone, Default)]
pub struct HelperScope {
    vars: BTreeMap<String, String>,
    helpers: BTreeMap<String, Helper>,
}

impl HelperScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain string variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder form of [`set_var`](Self::set_var).
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(name, value);
        self
    }

    /// Look up a plain variable.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Register a named helper function.
    pub fn register(&mut self, name: impl Into<String>, helper: impl Fn(&HelperScope) -> String + 'static) {
        self.helpers.insert(name.into(), Rc::new(helper));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_helper(
        mut self,
        name: impl Into<String>,
        helper: impl Fn(&HelperScope) -> String + 'static,
    ) -> Self {
        self.register(name, helper);
        self
    }

    /// Resolve a placeholder name: variables first, then helpers.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        self.helpers.get(name).map(|helper| helper(self))
    }
}

impl std::fmt::Debug for HelperScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperScope")
            .field("vars", &self.vars)
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Evaluates template text against a scope.
pub trait TemplateEngine {
    fn evaluate(&self, template: &str, scope: &HelperScope) -> BuildResult<String>;
}

/// Default engine: substitutes `{{ name }}` placeholders from the scope.
///
/// A placeholder that resolves to nothing is left in the output untouched,
/// so source text that happens to contain double braces is never mangled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderEngine;

impl TemplateEngine for PlaceholderEngine {
    fn evaluate(&self, template: &str, scope: &HelperScope) -> BuildResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let name = after[..end].trim();
                    match scope.resolve(name) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push_str("{{");
                            out.push_str(&after[..end]);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    // unbalanced opener, keep it literal
                    out.push_str("{{");
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}
