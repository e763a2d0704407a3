//! Shared test utilities for the contentpress test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let files = FileSet::load(&tmp.path().join("src")).unwrap();
//! let record = find_record(&files, "index.md");
//! assert_eq!(record.metadata.title, "Home");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::fileset::FileSet;
use crate::types::{Entry, FileRecord, RecordKind};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Record builders and lookups
// =========================================================================

/// A per-entry record as the mapper would stage it, with `title` as both
/// the entry's title field and the record contents.
pub fn entry_record(content_type: &str, id: &str, path: &str, title: &str) -> FileRecord {
    let entry = Entry {
        id: id.to_string(),
        content_type: content_type.to_string(),
        fields: serde_json::json!({ "title": title })
            .as_object()
            .cloned()
            .unwrap(),
        locale: None,
    };
    let mut record = FileRecord::new(path, title);
    let meta = &mut record.metadata;
    meta.kind = RecordKind::Entry;
    meta.template = Some(content_type.to_string());
    meta.content_type = Some(content_type.to_string());
    meta.title = title.to_string();
    meta.listed = true;
    meta.data.insert("entry".to_string(), entry.to_value());
    meta.entry = Some(entry);
    record
}

/// Find a record by path. Panics with the available paths if not found.
pub fn find_record<'a>(files: &'a FileSet, path: &str) -> &'a FileRecord {
    files.get(path).unwrap_or_else(|| {
        panic!("record '{}' not found. Available: {:?}", path, files.paths())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_copy_source_tree() {
        let tmp = setup_fixtures();
        let files = FileSet::load(&tmp.path().join("src")).unwrap();
        let index = find_record(&files, "index.md");
        assert_eq!(index.metadata.title, "Home");
        assert!(files.contains("post/down-the-rabbit-hole.md"));
        assert!(tmp.path().join("templates/base.html").exists());
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn find_record_panics_with_paths() {
        find_record(&FileSet::new(), "missing.html");
    }
}
