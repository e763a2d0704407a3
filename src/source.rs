//! Entry source stage: produces the run's [`Entry`] list.
//!
//! With a `[contentful]` table, entries come from the Content Delivery API,
//! one request per content type. Without one, they are read from the source
//! tree: every `<content_type>/<name>.<entry_extension>` file whose front
//! matter carries the `entry_key` table is an entry.
//!
//! ```text
//! ---
//! contentful:
//!   id: 1asN98Ph3mUiCYIYiiqwko
//!   locale: en-US
//!   fields:
//!     title: Down the Rabbit Hole
//! ---
//! Optional body, exposed as `fields.body`.
//! ```
//!
//! Local entry files are consumed: they are removed from the file set so they
//! are not copied to the output verbatim.

use crate::config::{Config, ConfigError};
use crate::contentful::ContentfulClient;
use crate::error::BuildError;
use crate::fileset::FileSet;
use crate::types::{Entry, FileRecord};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Collect entries for every configured content type, in content type order
/// and then fetch or file order.
///
/// A run without any content type has nothing to build and fails, in both
/// modes.
pub async fn fetch_entries(config: &Config, files: &mut FileSet) -> Result<Vec<Entry>, BuildError> {
    let content_types = config.content_types();
    if content_types.is_empty() {
        return Err(ConfigError::NoContentTypes.into());
    }
    match &config.contentful {
        Some(remote) => {
            let client = ContentfulClient::new(remote)?;
            let mut entries = Vec::new();
            for content_type in &content_types {
                entries.extend(client.fetch_entries(content_type).await?);
            }
            Ok(entries)
        }
        None => {
            let mut entries = Vec::new();
            for content_type in &content_types {
                entries.extend(read_local_entries(config, files, content_type)?);
            }
            Ok(entries)
        }
    }
}

fn read_local_entries(
    config: &Config,
    files: &mut FileSet,
    content_type: &str,
) -> Result<Vec<Entry>, ConfigError> {
    let prefix = format!("{content_type}/");
    let suffix = format!(".{}", config.entry_extension);
    let candidates: Vec<String> = files
        .iter()
        .filter(|r| {
            r.path.starts_with(&prefix)
                && r.path.ends_with(&suffix)
                && !r.path[prefix.len()..].contains('/')
                && r.metadata.data.contains_key(&config.entry_key)
        })
        .map(|r| r.path.clone())
        .collect();

    let mut entries = Vec::with_capacity(candidates.len());
    for path in candidates {
        if let Some(record) = files.remove(&path) {
            let entry = entry_from_record(&record, content_type, &config.entry_key)?;
            debug!(path, id = %entry.id, "read local entry");
            entries.push(entry);
        }
    }

    if entries.is_empty() {
        return Err(ConfigError::NoLocalEntries {
            content_type: content_type.to_string(),
            dir: config.src.join(content_type).display().to_string(),
            extension: config.entry_extension.clone(),
            entry_key: config.entry_key.clone(),
        });
    }
    info!(content_type, count = entries.len(), "read local entries");
    Ok(entries)
}

fn entry_from_record(record: &FileRecord, content_type: &str, entry_key: &str) -> Result<Entry, ConfigError> {
    let bad = |message: &str| ConfigError::FrontMatter {
        path: record.path.clone(),
        message: format!("'{entry_key}' {message}"),
    };

    let table = match record.metadata.data.get(entry_key) {
        Some(Value::Object(table)) => table,
        _ => return Err(bad("must be a mapping")),
    };

    let id = match table.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        None => Path::new(&record.path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        _ => return Err(bad("id must be a non-empty string")),
    };

    let locale = match table.get("locale") {
        Some(Value::String(locale)) => Some(locale.clone()),
        None | Some(Value::Null) => None,
        _ => return Err(bad("locale must be a string")),
    };

    let mut fields = match table.get("fields") {
        Some(Value::Object(fields)) => fields.clone(),
        None | Some(Value::Null) => Map::new(),
        _ => return Err(bad("fields must be a mapping")),
    };

    let body = record.contents_str();
    if !body.trim().is_empty() && !fields.contains_key("body") {
        fields.insert("body".to_string(), Value::String(body.into_owned()));
    }

    Ok(Entry {
        id,
        content_type: content_type.to_string(),
        fields,
        locale,
    })
}
