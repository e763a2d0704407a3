//! Listing assembler: aggregate pages over per-entry records.
//!
//! A listing gathers the listed per-entry records of its content types from
//! the file set, then applies, in order: locale match, filters, ordering and
//! limit. The resulting record's contents are the selected titles joined with
//! no separator; a template can produce richer output from the `key` array.
//! A listing that selects nothing is still emitted, with empty contents.
//!
//! An entry staged by several definitions of its content type is listed once,
//! through the first listed record staged for it.

use crate::config::ListingDefinition;
use crate::error::RenderError;
use crate::fileset::FileSet;
use crate::filter::{matches_all, sort_by_field};
use crate::naming::check_output_path;
use crate::types::{FileRecord, RecordKind};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

pub fn assemble_listing(files: &FileSet, def: &ListingDefinition) -> Result<FileRecord, RenderError> {
    let path = check_output_path(&def.path)?;

    let mut seen = HashSet::new();
    let mut selected: Vec<&FileRecord> = Vec::new();
    for record in files.of_content_types(&def.content_types) {
        if !record.metadata.listed {
            continue;
        }
        if let Some(entry) = &record.metadata.entry
            && !seen.insert((entry.content_type.as_str(), entry.id.as_str()))
        {
            continue;
        }
        if let Some(locale) = &def.locale
            && record.metadata.locale.as_ref() != Some(locale)
        {
            continue;
        }
        if let Some(entry) = &record.metadata.entry
            && !matches_all(&def.filter, entry)?
        {
            continue;
        }
        selected.push(record);
    }

    match &def.order_by {
        Some(order_by) => sort_by_field(&mut selected, order_by, |r| r.metadata.entry.as_ref())?,
        None => selected.sort_by_key(|r| r.metadata.order),
    }
    if let Some(limit) = def.limit {
        selected.truncate(limit);
    }

    let contents: String = selected.iter().map(|r| r.metadata.title.as_str()).collect();
    let items: Vec<Value> = selected
        .iter()
        .map(|r| listing_item(r))
        .collect();
    debug!(path, count = items.len(), "assembled listing");

    let mut data = Map::new();
    data.insert(def.key.clone(), Value::Array(items));

    let title = def.title.clone().unwrap_or_else(|| {
        Path::new(&path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let mut record = FileRecord::new(path, contents);
    let meta = &mut record.metadata;
    meta.kind = RecordKind::Listing;
    meta.template = def.template.clone();
    meta.layout = def.layout.clone();
    meta.title = title;
    meta.locale = def.locale.clone();
    meta.data = data;
    Ok(record)
}

/// Template view of one listed record: the entry plus where its page lives.
fn listing_item(record: &FileRecord) -> Value {
    let mut item = match record.metadata.entry.as_ref().map(|e| e.to_value()) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    item.insert("path".into(), Value::String(record.path.clone()));
    item.insert("title".into(), Value::String(record.metadata.title.clone()));
    Value::Object(item)
}
