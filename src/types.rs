//! Shared types passed between the source, mapper, listing and render stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One content record, as returned by the CMS or read from the local tree.
///
/// Entries are never mutated after the source stage produces them; the mapper
/// and the listing assembler only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier, unique within a content type.
    pub id: String,
    /// Content type identifier (e.g. `2wKn6yEnZewu2SCCkus4as`).
    pub content_type: String,
    /// Field values keyed by field name. Schema is whatever the CMS returns.
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Entry {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Textual representation used in listings: the title field when it is a
    /// non-empty string, the entry id otherwise.
    pub fn display_title(&self, title_field: &str) -> String {
        match self.fields.get(title_field) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => self.id.clone(),
        }
    }

    /// JSON shape exposed to templates.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Where a staged file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    /// Loaded from the source tree.
    #[default]
    Source,
    /// Produced by the entry mapper.
    Entry,
    /// Produced by the listing assembler.
    Listing,
}

/// Metadata attached to a staged file.
#[derive(Debug, Clone, Default)]
pub struct RecordMetadata {
    pub kind: RecordKind,
    /// Template rendering this record's contents.
    pub template: Option<String>,
    /// Layout wrapping the rendered template output.
    pub layout: Option<String>,
    /// Content type for per-entry records. `None` for listings and source files.
    pub content_type: Option<String>,
    pub title: String,
    /// Position among the records of the same entry definition.
    pub order: usize,
    pub locale: Option<String>,
    /// Whether listings may include this record.
    pub listed: bool,
    /// Source entry for per-entry records.
    pub entry: Option<Entry>,
    /// Values exposed to templates (front matter, raw entries).
    pub data: Map<String, Value>,
}

/// A virtual output file staged in the [`FileSet`](crate::fileset::FileSet).
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Relative output path, `/`-separated.
    pub path: String,
    pub contents: Vec<u8>,
    pub metadata: RecordMetadata,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            metadata: RecordMetadata::default(),
        }
    }

    pub fn contents_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    pub fn is_generated(&self) -> bool {
        self.metadata.kind != RecordKind::Source
    }
}
