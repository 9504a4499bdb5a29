//! Minification seam and the built-in stripping packer
//!
//! The engine treats minification as an opaque operation: code and settings
//! in, packed code (plus an optional source map) out, behind the
//! [`Minifier`] trait. The built-in [`StripMinifier`] removes comments and
//! squeezes whitespace without renaming anything; identifier-shrinking
//! settings (`shrink_vars`, `base62`, `private`) are accepted and passed
//! through so an external packer that honors them can be swapped in.

use crate::error::{BuildError, BuildResult};
use mortar_config::MinifySettings;
use std::path::{Path, PathBuf};

/// Everything a packer invocation needs besides the code itself.
#[derive(Debug, Clone, Copy)]
pub struct PackRequest<'a> {
    /// Resolved minification settings for the artifact.
    pub settings: &'a MinifySettings,
    /// Header banner, emitted verbatim ahead of the packed code.
    pub header: Option<&'a str>,
    /// Artifact path, for source-map bookkeeping. `None` when the code is
    /// packed as a fragment of a larger artifact.
    pub output_path: Option<&'a Path>,
    /// Files the code was read from, listed in the source map.
    pub sources: &'a [PathBuf],
}

/// Result of one packer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyOutput {
    pub code: String,
    /// Source-map payload to write next to the artifact, when requested.
    pub source_map: Option<String>,
}

/// An opaque minifier.
pub trait Minifier {
    fn minify(&self, code: &str, request: &PackRequest<'_>) -> BuildResult<MinifyOutput>;
}

/// Built-in packer: comment stripping and whitespace squeezing only.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripMinifier;

impl Minifier for StripMinifier {
    fn minify(&self, code: &str, request: &PackRequest<'_>) -> BuildResult<MinifyOutput> {
        let stripped = strip(code).map_err(BuildError::Packer)?;

        let mut out = String::with_capacity(stripped.len());
        if let Some(header) = request.header {
            out.push_str(header);
            out.push('\n');
        }
        out.push_str(&stripped);

        let source_map = match (request.settings.wants_source_map(), request.output_path) {
            (true, Some(path)) => {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    out.push_str(&format!("\n//# sourceMappingURL={name}.map"));
                }
                Some(source_map_payload(path, request.sources))
            }
            _ => None,
        };

        Ok(MinifyOutput {
            code: out,
            source_map,
        })
    }
}

/// Minimal source-map v3 payload. The stripping packer keeps line structure
/// but does not translate positions, so no mapping segments are emitted.
fn source_map_payload(output: &Path, sources: &[PathBuf]) -> String {
    let file = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sources: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();

    serde_json::json!({
        "version": 3,
        "file": file,
        "sources": sources,
        "names": [],
        "mappings": "",
    })
    .to_string()
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Code,
    Str(char),
    Template,
    Regex { in_class: bool },
    LineComment,
    BlockComment,
}

/// Strip comments and squeeze whitespace.
///
/// A character-level scan tracking string, template-literal, and regex
/// contexts so their contents pass through verbatim. Whether a `/` starts a
/// regex literal is decided from the previous significant character, which
/// is the usual scanner heuristic and good enough for generated bundles.
fn strip(code: &str) -> Result<String, String> {
    let mut out = String::with_capacity(code.len());
    let mut state = State::Code;
    let mut escaped = false;
    let mut pending_space = false;
    let mut at_line_start = true;
    let mut last_code_char: Option<char> = None;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        state = State::LineComment;
                    }
                    Some('*') => {
                        chars.next();
                        state = State::BlockComment;
                    }
                    _ => {
                        flush_space(&mut out, &mut pending_space);
                        out.push('/');
                        at_line_start = false;
                        if regex_can_follow(last_code_char) {
                            state = State::Regex { in_class: false };
                            escaped = false;
                        }
                        last_code_char = Some('/');
                    }
                },
                '"' | '\'' => {
                    flush_space(&mut out, &mut pending_space);
                    out.push(c);
                    at_line_start = false;
                    state = State::Str(c);
                    escaped = false;
                    last_code_char = Some(c);
                }
                '`' => {
                    flush_space(&mut out, &mut pending_space);
                    out.push(c);
                    at_line_start = false;
                    state = State::Template;
                    escaped = false;
                    last_code_char = Some('`');
                }
                '\n' => {
                    pending_space = false;
                    if !at_line_start {
                        out.push('\n');
                        at_line_start = true;
                    }
                }
                c if c.is_whitespace() => {
                    if !at_line_start {
                        pending_space = true;
                    }
                }
                _ => {
                    flush_space(&mut out, &mut pending_space);
                    out.push(c);
                    at_line_start = false;
                    last_code_char = Some(c);
                }
            },
            State::Str(quote) => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    state = State::Code;
                    last_code_char = Some(quote);
                } else if c == '\n' {
                    // not legal in a plain string; recover rather than eat code
                    state = State::Code;
                    at_line_start = true;
                }
            }
            State::Template => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '`' {
                    state = State::Code;
                    last_code_char = Some('`');
                }
            }
            State::Regex { in_class } => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '[' {
                    state = State::Regex { in_class: true };
                } else if c == ']' && in_class {
                    state = State::Regex { in_class: false };
                } else if c == '/' && !in_class {
                    state = State::Code;
                    last_code_char = Some('/');
                } else if c == '\n' {
                    // the slash was division after all
                    state = State::Code;
                    at_line_start = true;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    pending_space = false;
                    if !at_line_start {
                        out.push('\n');
                        at_line_start = true;
                    }
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    // a comment between tokens separates them
                    if !at_line_start {
                        pending_space = true;
                    }
                    state = State::Code;
                }
            }
        }
    }

    if state == State::BlockComment {
        return Err("unterminated block comment".to_string());
    }

    Ok(out)
}

fn flush_space(out: &mut String, pending: &mut bool) {
    if *pending {
        out.push(' ');
        *pending = false;
    }
}

/// Whether a `/` after this character can start a regex literal.
fn regex_can_follow(last: Option<char>) -> bool {
    match last {
        None => true,
        Some(c) => matches!(
            c,
            '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '+' | '-'
                | '*' | '%' | '^' | '<' | '>' | '~'
        ),
    }
}
