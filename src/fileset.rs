//! The in-memory file set every stage reads from and writes to.
//!
//! Records keep insertion order so listings that tie on their order key fall
//! back to fetch order. Paths are unique; inserting a path twice is an error
//! rather than a silent overwrite.
//!
//! ## Front Matter
//!
//! Text files in the source tree may start with a YAML block:
//!
//! ```text
//! ---
//! title: Home
//! layout: base.html
//! ---
//! Home Page Content
//! ```
//!
//! The mapping becomes the record's template data; `title`, `template` and
//! `layout` also populate the matching metadata fields. The block is stripped
//! from the contents.

use crate::config::ConfigError;
use crate::error::RenderError;
use crate::types::{FileRecord, RecordKind};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct FileSet {
    records: Vec<FileRecord>,
    paths: HashSet<String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every non-hidden file under `root`. A missing root yields an
    /// empty set.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        if !root.is_dir() {
            debug!(root = %root.display(), "source directory missing, starting empty");
            return Ok(set);
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for dir_entry in walker {
            let dir_entry = dir_entry.map_err(std::io::Error::from)?;
            if !dir_entry.file_type().is_file() {
                continue;
            }
            let rel = relative_path(root, dir_entry.path());
            let bytes = fs::read(dir_entry.path())?;
            let record = parse_source_file(&rel, bytes)?;
            // walkdir yields each path once, so this cannot collide.
            set.paths.insert(record.path.clone());
            set.records.push(record);
        }
        debug!(root = %root.display(), files = set.len(), "loaded source tree");
        Ok(set)
    }

    pub fn insert(&mut self, record: FileRecord) -> Result<(), RenderError> {
        if !self.paths.insert(record.path.clone()) {
            return Err(RenderError::DuplicatePath(record.path));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Option<FileRecord> {
        if !self.paths.remove(path) {
            return None;
        }
        let idx = self.records.iter().position(|r| r.path == path)?;
        Some(self.records.remove(idx))
    }

    /// Move a record to a new path, keeping its position.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), RenderError> {
        if from == to {
            return Ok(());
        }
        if self.paths.contains(to) {
            return Err(RenderError::DuplicatePath(to.to_string()));
        }
        if let Some(record) = self.records.iter_mut().find(|r| r.path == from) {
            self.paths.remove(from);
            self.paths.insert(to.to_string());
            record.path = to.to_string();
        }
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FileRecord> {
        self.records.iter_mut()
    }

    /// Per-entry records of any of `content_types`, in insertion order.
    pub fn of_content_types<'a>(
        &'a self,
        content_types: &'a [String],
    ) -> impl Iterator<Item = &'a FileRecord> + 'a {
        self.records.iter().filter(move |r| {
            r.metadata.kind == RecordKind::Entry
                && r.metadata
                    .content_type
                    .as_ref()
                    .is_some_and(|ct| content_types.contains(ct))
        })
    }

    pub fn paths(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record under `dest`, creating directories as needed.
    /// With `clean`, `dest` is removed first. Returns the written paths.
    pub fn write(&self, dest: &Path, clean: bool) -> std::io::Result<Vec<PathBuf>> {
        if clean && dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        fs::create_dir_all(dest)?;

        let mut written = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let target = record.path.split('/').fold(dest.to_path_buf(), |p, part| p.join(part));
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &record.contents)?;
            written.push(target);
        }
        Ok(written)
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build a source record, splitting off front matter when present.
fn parse_source_file(rel_path: &str, bytes: Vec<u8>) -> Result<FileRecord, ConfigError> {
    let stem = Path::new(rel_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let split = match std::str::from_utf8(&bytes).ok().and_then(split_front_matter) {
        Some((yaml, body)) => Some((parse_front_matter(rel_path, yaml)?, body.as_bytes().to_vec())),
        None => None,
    };
    let (data, contents) = split.unwrap_or_else(|| (Map::new(), bytes));

    let mut record = FileRecord::new(rel_path, contents);
    record.metadata.title = data
        .get("title")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or(stem);
    record.metadata.template = data.get("template").and_then(Value::as_str).map(String::from);
    record.metadata.layout = data.get("layout").and_then(Value::as_str).map(String::from);
    record.metadata.data = data;
    Ok(record)
}

/// Returns `(yaml, body)` when `text` opens with a `---` fenced block.
pub(crate) fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn parse_front_matter(path: &str, yaml: &str) -> Result<Map<String, Value>, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::FrontMatter {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ConfigError::FrontMatter {
            path: path.to_string(),
            message: "front matter must be a mapping".to_string(),
        }),
    }
}
