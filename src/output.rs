//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! ## Build
//!
//! ```text
//! Entries
//! 001 1asN98Ph3mUiCYIYiiqwko.html
//! 002 A96usFSlY4G0W4kwAqswk.html
//!
//! Listings
//! 001 posts.html
//!
//! Built 2 entries, 2 entry pages, 1 listing, 1 source file → build
//! ```
//!
//! ## Check
//!
//! ```text
//! Source: remote (space cfexampleapi, environment master)
//!
//! Content types
//! 001 2wKn6yEnZewu2SCCkus4as → {id}.html
//!     Template: 2wKn6yEnZewu2SCCkus4as (optional)
//!
//! Listings
//! 001 posts.html ← 2wKn6yEnZewu2SCCkus4as
//!
//! Planned files
//! 001 1asN98Ph3mUiCYIYiiqwko.html (entry)
//! 002 posts.html (listing)
//! ```

use crate::config::{Config, EntryDefinition, ListingDefinition};
use crate::fileset::FileSet;
use crate::pipeline::BuildReport;
use crate::types::RecordKind;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.entry_pages.is_empty() {
        lines.push("Entries".to_string());
        for (i, path) in report.entry_pages.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), path));
        }
    }

    if !report.listings.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Listings".to_string());
        for (i, path) in report.listings.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), path));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Built {}, {}, {}, {} \u{2192} {}",
        plural(report.entries, "entry", "entries"),
        plural(report.entry_pages.len(), "entry page", "entry pages"),
        plural(report.listings.len(), "listing", "listings"),
        plural(report.source_files, "source file", "source files"),
        report.dest.display()
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(config: &Config) -> Vec<String> {
    let mut lines = Vec::new();

    match &config.contentful {
        Some(remote) => lines.push(format!(
            "Source: remote (space {}, environment {})",
            remote.space_id, remote.environment
        )),
        None => lines.push(format!(
            "Source: local ({}/<content_type>/*.{}, key '{}')",
            config.src.display(),
            config.entry_extension,
            config.entry_key
        )),
    }

    let defs = config.entry_definitions();
    if !defs.is_empty() {
        lines.push(String::new());
        lines.push("Content types".to_string());
        for (i, def) in defs.iter().enumerate() {
            let naming = naming_summary(config, def);
            lines.push(format!("{} {} \u{2192} {}", format_index(i + 1), def.content_type, naming));
            lines.extend(definition_details(def));
        }
    }

    if !config.listings.is_empty() {
        lines.push(String::new());
        lines.push("Listings".to_string());
        for (i, listing) in config.listings.iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2190} {}",
                format_index(i + 1),
                listing.path,
                listing.content_types.join(", ")
            ));
            lines.extend(listing_details(listing));
        }
    }

    lines
}

pub fn print_check_output(config: &Config) {
    for line in format_check_output(config) {
        println!("{}", line);
    }
}

/// Every staged file with where it came from.
///
/// ```text
/// Planned files
/// 001 index.html (source)
/// 002 1asN98Ph3mUiCYIYiiqwko.html (entry)
/// 003 posts.html (listing)
/// ```
pub fn format_planned_files(files: &FileSet) -> Vec<String> {
    let mut lines = vec!["Planned files".to_string()];
    for (i, record) in files.iter().enumerate() {
        let kind = match record.metadata.kind {
            RecordKind::Source => "source",
            RecordKind::Entry => "entry",
            RecordKind::Listing => "listing",
        };
        lines.push(format!("{} {} ({kind})", format_index(i + 1), record.path));
    }
    lines
}

pub fn print_planned_files(files: &FileSet) {
    for line in format_planned_files(files) {
        println!("{}", line);
    }
}

fn naming_summary(config: &Config, def: &EntryDefinition) -> String {
    let parent = if def.parent_dir.is_empty() {
        String::new()
    } else {
        format!("{}/", def.parent_dir.trim_matches('/'))
    };
    if let Some(path) = &def.path {
        path.clone()
    } else if let Some(pattern) = config.filename_builders.get(def.builder_name()) {
        format!("{pattern} (pattern)")
    } else if let Some(name) = &def.filename_builder {
        format!("builder '{name}'")
    } else if def.permalink {
        format!("{parent}{{id}}/index.{}", def.extension)
    } else {
        format!("{parent}{{id}}.{}", def.extension)
    }
}

fn definition_details(def: &EntryDefinition) -> Vec<String> {
    let mut lines = Vec::new();
    let pad = indent(1);
    if let Some(id) = &def.entry_id {
        lines.push(format!("{pad}Entry: {id}"));
    }
    match &def.template {
        Some(t) => lines.push(format!("{pad}Template: {t}")),
        None => lines.push(format!("{pad}Template: {} (optional)", def.content_type)),
    }
    if let Some(layout) = &def.layout {
        lines.push(format!("{pad}Layout: {layout}"));
    }
    if let Some(order) = &def.order_by {
        let dir = if order.descending { "descending" } else { "ascending" };
        lines.push(format!("{pad}Order: {} {dir}", order.field));
    }
    if !def.filter.is_empty() {
        lines.push(format!("{pad}Filters: {}", def.filter.len()));
    }
    lines
}

fn listing_details(listing: &ListingDefinition) -> Vec<String> {
    let mut lines = Vec::new();
    let pad = indent(1);
    if let Some(t) = &listing.template {
        lines.push(format!("{pad}Template: {t}"));
    }
    if let Some(layout) = &listing.layout {
        lines.push(format!("{pad}Layout: {layout}"));
    }
    if let Some(locale) = &listing.locale {
        lines.push(format!("{pad}Locale: {locale}"));
    }
    if let Some(limit) = listing.limit {
        lines.push(format!("{pad}Limit: {limit}"));
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================
