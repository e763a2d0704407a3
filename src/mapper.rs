//! Entry mapper: one output record per entry.
//!
//! For each entry definition, the entries of its content type become
//! [`FileRecord`]s at the path their [`PathStrategy`] resolves. The record's
//! contents start as the entry's display title; the render stage replaces
//! them when a template applies.
//!
//! A definition with an `entry_id` maps that one entry only. Its page is a
//! standalone page: it never shows up in listings, and a missing entry fails
//! the build.

use crate::config::EntryDefinition;
use crate::error::RenderError;
use crate::filter::{matches_all, sort_by_field};
use crate::naming::{FilenameBuilders, PathStrategy};
use crate::types::{Entry, FileRecord, RecordKind};
use serde_json::Map;
use tracing::debug;

/// Map the entries of `def.content_type` into records, in definition order
/// (`order_by` when set, fetch order otherwise).
pub fn map_entries(
    entries: &[Entry],
    def: &EntryDefinition,
    builders: &FilenameBuilders,
) -> Result<Vec<FileRecord>, RenderError> {
    let mut selected: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.content_type == def.content_type)
        .filter(|e| def.entry_id.as_ref().is_none_or(|id| &e.id == id))
        .collect();
    if let Some(id) = &def.entry_id
        && selected.is_empty()
    {
        return Err(RenderError::EntryNotFound {
            content_type: def.content_type.clone(),
            id: id.clone(),
        });
    }
    if let Some(order_by) = &def.order_by {
        sort_by_field(&mut selected, order_by, |e| Some(*e))?;
    }

    let strategy = PathStrategy::for_definition(def, builders)?;
    debug!(content_type = %def.content_type, ?strategy, count = selected.len(), "mapping entries");

    selected
        .into_iter()
        .enumerate()
        .map(|(order, entry)| map_entry(entry, order, def, &strategy))
        .collect()
}

fn map_entry(
    entry: &Entry,
    order: usize,
    def: &EntryDefinition,
    strategy: &PathStrategy,
) -> Result<FileRecord, RenderError> {
    let path = strategy.resolve(entry, def)?;
    let title = entry.display_title(&def.title_field);
    let listed = matches_all(&def.filter, entry)? && !def.is_single();

    let mut data = Map::new();
    data.insert(def.key.clone(), entry.to_value());

    let mut record = FileRecord::new(path, title.clone());
    let meta = &mut record.metadata;
    meta.kind = RecordKind::Entry;
    meta.template = Some(def.template_name().to_string());
    meta.layout = def.layout.clone();
    meta.content_type = Some(def.content_type.clone());
    meta.title = title;
    meta.order = order;
    meta.locale = entry.locale.clone();
    meta.listed = listed;
    meta.entry = Some(entry.clone());
    meta.data = data;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrderBy;
    use crate::filter::{FieldFilter, FilterOp};
    use serde_json::{Value, json};

    const POST: &str = "2wKn6yEnZewu2SCCkus4as";

    fn entry(id: &str, content_type: &str, fields: Value) -> Entry {
        Entry {
            id: id.into(),
            content_type: content_type.into(),
            fields: fields.as_object().cloned().unwrap(),
            locale: Some("en-US".into()),
        }
    }

    fn fixture_entries() -> Vec<Entry> {
        vec![
            entry("1asN98Ph3mUiCYIYiiqwko", POST, json!({"title": "Down the Rabbit Hole", "rank": 2})),
            entry("author-1", "author", json!({"name": "Lewis"})),
            entry(
                "A96usFSlY4G0W4kwAqswk",
                POST,
                json!({"title": "Seven Tips From Ernest Hemingway on How to Write Fiction", "rank": 1}),
            ),
        ]
    }

    #[test]
    fn one_record_per_entry_of_the_content_type() {
        let def = EntryDefinition::new(POST);
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();

        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["1asN98Ph3mUiCYIYiiqwko.html", "A96usFSlY4G0W4kwAqswk.html"]);
        assert_eq!(records[0].contents_str(), "Down the Rabbit Hole");
        assert_eq!(records[1].metadata.order, 1);
    }

    #[test]
    fn record_metadata_carries_entry() {
        let mut def = EntryDefinition::new(POST);
        def.key = "post".into();
        def.layout = Some("base.html".into());
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();

        let meta = &records[0].metadata;
        assert_eq!(meta.kind, RecordKind::Entry);
        assert_eq!(meta.template.as_deref(), Some(POST));
        assert_eq!(meta.layout.as_deref(), Some("base.html"));
        assert_eq!(meta.content_type.as_deref(), Some(POST));
        assert_eq!(meta.locale.as_deref(), Some("en-US"));
        assert!(meta.listed);
        assert_eq!(meta.data["post"]["fields"]["title"], json!("Down the Rabbit Hole"));
        assert_eq!(meta.entry.as_ref().unwrap().id, "1asN98Ph3mUiCYIYiiqwko");
    }

    #[test]
    fn order_by_sorts_before_numbering() {
        let mut def = EntryDefinition::new(POST);
        def.order_by = Some(OrderBy { field: "rank".into(), descending: false });
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();

        assert_eq!(records[0].path, "A96usFSlY4G0W4kwAqswk.html");
        assert_eq!(records[0].metadata.order, 0);
    }

    #[test]
    fn filter_marks_records_unlisted_but_keeps_them() {
        let mut def = EntryDefinition::new(POST);
        def.filter = vec![FieldFilter::new("title", FilterOp::Contains, Some(json!("Rabbit")))];
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].metadata.listed);
        assert!(!records[1].metadata.listed);
    }

    #[test]
    fn title_falls_back_to_id() {
        let mut def = EntryDefinition::new("author");
        def.title_field = "headline".into();
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();
        assert_eq!(records[0].contents_str(), "author-1");
    }

    #[test]
    fn parent_dir_permalink_and_extension() {
        let mut def = EntryDefinition::new(POST);
        def.parent_dir = "posts".into();
        def.permalink = true;
        def.extension = "htm".into();
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();
        assert_eq!(records[0].path, "posts/1asN98Ph3mUiCYIYiiqwko/index.htm");
    }

    #[test]
    fn custom_builder_overrides_permalink() {
        let mut def = EntryDefinition::new(POST);
        def.permalink = true;
        let mut builders = FilenameBuilders::new();
        builders.insert_fn(POST, |e| Ok(format!("blog/{}.html", e.id)));
        let records = map_entries(&fixture_entries(), &def, &builders).unwrap();
        assert_eq!(records[0].path, "blog/1asN98Ph3mUiCYIYiiqwko.html");
    }

    #[test]
    fn single_entry_definition_maps_one_unlisted_page() {
        let mut def = EntryDefinition::new(POST);
        def.entry_id = Some("A96usFSlY4G0W4kwAqswk".into());
        def.path = Some("single-post.html".into());
        def.template = Some("single.html".into());
        let records = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "single-post.html");
        assert_eq!(records[0].metadata.template.as_deref(), Some("single.html"));
        assert!(!records[0].metadata.listed);
    }

    #[test]
    fn single_entry_definition_requires_the_entry() {
        let mut def = EntryDefinition::new(POST);
        def.entry_id = Some("nope".into());
        let err = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap_err();
        assert!(matches!(err, RenderError::EntryNotFound { ref id, .. } if id == "nope"));
    }

    #[test]
    fn no_matching_entries_yields_nothing() {
        let def = EntryDefinition::new("page");
        assert!(map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap().is_empty());
    }

    #[test]
    fn filter_on_missing_field_fails() {
        let mut def = EntryDefinition::new("author");
        def.filter = vec![FieldFilter::new("title", FilterOp::Equals, Some(json!("x")))];
        let err = map_entries(&fixture_entries(), &def, &FilenameBuilders::new()).unwrap_err();
        assert!(matches!(err, RenderError::MissingField { ref entry_id, .. } if entry_id == "author-1"));
    }
}
