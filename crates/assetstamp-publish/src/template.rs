//! Reference rewriting for the HTML entry page.
//!
//! Templates reference assets by logical name as `{{ name }}`. Rendering swaps
//! each placeholder for the asset's published file name. There is no optional
//! placeholder form: an unresolved name fails the render so a broken asset link
//! can never be shipped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::manifest::AssetManifest;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholder with no entry in the mapping.
    #[error("template {template}: unresolved placeholder `{name}`")]
    MissingVariable { template: String, name: String },

    /// Invalid template syntax.
    #[error("template {template}: invalid syntax: {message}")]
    InvalidSyntax { template: String, message: String },

    /// Template file could not be read.
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// A piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// An HTML template with `{{ name }}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a template from disk, named after its path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template, substituting every placeholder from `mapping`.
    ///
    /// Substituted values are not rescanned.
    pub fn render(&self, mapping: &AssetManifest) -> Result<String> {
        render_named(&self.name, &self.content, mapping)
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Result<Vec<String>> {
        placeholders_named(&self.name, &self.content)
    }
}

/// Render `template_text` against `mapping`.
pub fn render(template_text: &str, mapping: &AssetManifest) -> Result<String> {
    render_named("<inline>", template_text, mapping)
}

/// Distinct placeholder names referenced by `template_text`.
pub fn placeholders(template_text: &str) -> Result<Vec<String>> {
    placeholders_named("<inline>", template_text)
}

fn render_named(name: &str, text: &str, mapping: &AssetManifest) -> Result<String> {
    let mut out = String::with_capacity(text.len());

    for segment in parse(name, text)? {
        match segment {
            Segment::Text(s) => out.push_str(s),
            Segment::Placeholder(var) => {
                let value = mapping
                    .get(var)
                    .ok_or_else(|| TemplateError::MissingVariable {
                        template: name.to_string(),
                        name: var.to_string(),
                    })?;
                out.push_str(value);
            }
        }
    }

    Ok(out)
}

fn placeholders_named(name: &str, text: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse(name, text)? {
        if let Segment::Placeholder(var) = segment {
            if !names.iter().any(|n| n == var) {
                names.push(var.to_string());
            }
        }
    }
    Ok(names)
}

fn parse<'a>(name: &str, text: &'a str) -> Result<Vec<Segment<'a>>> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }

        let inner_start = start + OPEN.len();
        let end = rest[inner_start..]
            .find(CLOSE)
            .ok_or_else(|| TemplateError::InvalidSyntax {
                template: name.to_string(),
                message: format!("unclosed {OPEN} at byte {}", offset + start),
            })?;

        let var = rest[inner_start..inner_start + end].trim();
        if var.is_empty() {
            return Err(TemplateError::InvalidSyntax {
                template: name.to_string(),
                message: format!("empty placeholder at byte {}", offset + start),
            });
        }
        segments.push(Segment::Placeholder(var));

        let consumed = inner_start + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }

    Ok(segments)
}
