//! Output path resolution for per-entry files.
//!
//! Every entry definition resolves to one [`PathStrategy`]. The first that
//! applies wins:
//!
//! 1. **Fixed**: the `path` of a single-entry definition.
//! 2. **Custom**: a [`FilenameBuilder`] registered under the definition's
//!    `filename_builder` name (the content type id by default), either a
//!    closure passed to
//!    [`Pipeline::filename_builder`](crate::pipeline::Pipeline::filename_builder)
//!    or a `[filename_builders]` pattern from the config. A definition that
//!    names a builder nobody registered fails.
//! 3. **Permalink**: `<parent_dir>/<id>/index.<ext>`, for clean URLs.
//! 4. **Default**: `<parent_dir>/<id>.<ext>`.
//!
//! ## Patterns
//!
//! Config patterns substitute `{...}` placeholders:
//!
//! - `{id}`, `{content_type}`, `{locale}`: entry attributes
//! - `{title}`: any field value
//! - `{title|slug}`: field value run through [`slugify`]
//!
//! `"post-{title|slug}.html"` turns an entry titled "Down the Rabbit Hole"
//! into `post-down-the-rabbit-hole.html`.

use crate::config::EntryDefinition;
use crate::error::RenderError;
use crate::types::Entry;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Builds a relative output path for an entry.
pub trait FilenameBuilder: Send + Sync {
    fn build(&self, entry: &Entry) -> Result<String, RenderError>;
}

impl<F> FilenameBuilder for F
where
    F: Fn(&Entry) -> Result<String, RenderError> + Send + Sync,
{
    fn build(&self, entry: &Entry) -> Result<String, RenderError> {
        self(entry)
    }
}

/// Builder name (usually a content type id) → filename builder.
#[derive(Clone, Default)]
pub struct FilenameBuilders {
    builders: HashMap<String, Arc<dyn FilenameBuilder>>,
}

impl FilenameBuilders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `[filename_builders]` patterns.
    pub fn from_patterns(patterns: &BTreeMap<String, String>) -> Result<Self, PatternError> {
        let mut builders = Self::new();
        for (name, pattern) in patterns {
            builders.insert(name, FilenamePattern::parse(pattern)?);
        }
        Ok(builders)
    }

    /// Register a builder, replacing any earlier one under the same name.
    pub fn insert(&mut self, name: &str, builder: impl FilenameBuilder + 'static) {
        self.builders.insert(name.to_string(), Arc::new(builder));
    }

    /// Register a closure. Separate from [`insert`](Self::insert) so the
    /// closure's signature is inferred from the `Fn` bound.
    pub fn insert_fn<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&Entry) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.insert(name, builder);
    }

    /// Take every builder from `other`, replacing ours on conflict.
    pub fn merge(&mut self, other: &FilenameBuilders) {
        for (name, builder) in &other.builders {
            self.builders.insert(name.clone(), Arc::clone(builder));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FilenameBuilder>> {
        self.builders.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl fmt::Debug for FilenameBuilders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.builders.keys().collect();
        keys.sort();
        f.debug_struct("FilenameBuilders")
            .field("names", &keys)
            .finish()
    }
}

/// How one entry definition names its files.
#[derive(Clone)]
pub enum PathStrategy {
    Fixed(String),
    Default,
    Permalink,
    Custom(Arc<dyn FilenameBuilder>),
}

impl fmt::Debug for PathStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStrategy::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            PathStrategy::Default => f.write_str("Default"),
            PathStrategy::Permalink => f.write_str("Permalink"),
            PathStrategy::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl PathStrategy {
    /// Pick the strategy for a definition: fixed path, custom builder, then
    /// permalink, then default.
    pub fn for_definition(def: &EntryDefinition, builders: &FilenameBuilders) -> Result<Self, RenderError> {
        if let Some(path) = &def.path {
            return Ok(PathStrategy::Fixed(path.clone()));
        }
        match (builders.get(def.builder_name()), &def.filename_builder) {
            (Some(builder), _) => Ok(PathStrategy::Custom(builder)),
            (None, Some(name)) => Err(RenderError::UnknownBuilder(name.clone())),
            (None, None) if def.permalink => Ok(PathStrategy::Permalink),
            (None, None) => Ok(PathStrategy::Default),
        }
    }

    /// Resolve the output path of `entry` under `def`.
    pub fn resolve(&self, entry: &Entry, def: &EntryDefinition) -> Result<String, RenderError> {
        let path = match self {
            PathStrategy::Fixed(path) => path.clone(),
            PathStrategy::Custom(builder) => builder.build(entry)?,
            PathStrategy::Permalink => join_path(
                &def.parent_dir,
                &format!("{}/index.{}", entry.id, def.extension),
            ),
            PathStrategy::Default => {
                join_path(&def.parent_dir, &format!("{}.{}", entry.id, def.extension))
            }
        };
        check_output_path(&path)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Normalize a resolved path and reject anything that would escape the
/// output directory.
pub fn check_output_path(path: &str) -> Result<String, RenderError> {
    let invalid = |reason| {
        Err(RenderError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };
    let normalized = path.trim_start_matches("./");
    if normalized.is_empty() {
        return invalid("empty path");
    }
    if normalized.starts_with('/') || normalized.contains('\\') {
        return invalid("must be a relative '/'-separated path");
    }
    if normalized.ends_with('/') {
        return invalid("must name a file");
    }
    if normalized.split('/').any(|part| part == ".." || part.is_empty()) {
        return invalid("must not contain '..' or empty components");
    }
    Ok(normalized.to_string())
}

#[derive(Error, Debug, PartialEq)]
pub enum PatternError {
    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),
    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),
    #[error("empty placeholder at byte {0}")]
    EmptyPlaceholder(usize),
    #[error("unknown placeholder modifier '{0}' (only 'slug' is supported)")]
    UnknownModifier(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, slug: bool },
}

/// A compiled `[filename_builders]` pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenamePattern {
    segments: Vec<Segment>,
}

impl FilenamePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern.char_indices();

        while let Some((pos, c)) = rest.next() {
            match c {
                '{' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in rest.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(PatternError::Unclosed(pos)),
                            _ => inner.push(c),
                        }
                    }
                    if !closed {
                        return Err(PatternError::Unclosed(pos));
                    }
                    let (name, modifier) = match inner.split_once('|') {
                        Some((name, modifier)) => (name.trim(), Some(modifier.trim())),
                        None => (inner.trim(), None),
                    };
                    if name.is_empty() {
                        return Err(PatternError::EmptyPlaceholder(pos));
                    }
                    let slug = match modifier {
                        None => false,
                        Some("slug") => true,
                        Some(other) => return Err(PatternError::UnknownModifier(other.to_string())),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder {
                        name: name.to_string(),
                        slug,
                    });
                }
                '}' => return Err(PatternError::UnexpectedClose(pos)),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn render(&self, entry: &Entry) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, slug } => {
                    let value = placeholder_value(entry, name)?;
                    if *slug {
                        out.push_str(&slugify(&value));
                    } else {
                        out.push_str(&value);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl FilenameBuilder for FilenamePattern {
    fn build(&self, entry: &Entry) -> Result<String, RenderError> {
        self.render(entry)
    }
}

/// Entry attributes shadow fields of the same name.
fn placeholder_value(entry: &Entry, name: &str) -> Result<String, RenderError> {
    match name {
        "id" => return Ok(entry.id.clone()),
        "content_type" => return Ok(entry.content_type.clone()),
        "locale" => {
            return entry
                .locale
                .clone()
                .ok_or_else(|| RenderError::missing_field(&entry.id, "locale"));
        }
        _ => {}
    }
    match entry.field(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(RenderError::missing_field(&entry.id, name)),
        Some(other) => Ok(other.to_string()),
    }
}

const MAX_SLUG_LEN: usize = 80;

/// Lowercase URL-safe slug.
///
/// - ASCII letters are lowercased, digits kept
/// - Everything else becomes a dash; runs of dashes collapse to one
/// - Leading and trailing dashes are stripped
/// - Truncated to `MAX_SLUG_LEN`, breaking at the last dash before the limit
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}
