//! # Contentpress
//!
//! A static site build step that turns headless-CMS entries into files.
//! Entries come from the Contentful Content Delivery API, or from local
//! markdown files that mimic it, and become one page per entry plus any
//! number of listing pages aggregating them.
//!
//! # Architecture: One Pass Over an In-Memory File Set
//!
//! ```text
//! src/ ──load──▶ FileSet ──fetch──▶ entries ──map──▶ per-entry records
//!                   │                                       │
//!                   └──markdown──▶ .html    listings ◀──────┘
//!                                              │
//!                          render (templates, layouts) ──write──▶ dest/
//! ```
//!
//! Every stage reads and writes the explicit [`fileset::FileSet`]; there is
//! no shared mutable state between stages. The first error aborts the build
//! and the destination is only written once everything succeeded.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `contentpress.toml` loading, defaults and validation |
//! | [`contentful`] | Content Delivery API client and response normalization |
//! | [`source`] | Picks remote or local entries for the run |
//! | [`fileset`] | Ordered, path-unique set of staged files; front matter; writing |
//! | [`naming`] | Output path strategies and `[filename_builders]` patterns |
//! | [`filter`] | Field predicates and `order_by` sorting |
//! | [`mapper`] | Entries → per-entry records |
//! | [`listing`] | Per-entry records → aggregate listing records |
//! | [`render`] | Markdown conversion, Tera templates and layouts |
//! | [`pipeline`] | Stage orchestration and the build report |
//! | [`output`] | CLI output formatting |
//! | [`types`] | `Entry` and `FileRecord`, shared by every stage |
//! | [`error`] | `RenderError` and the top-level `BuildError` |
//!
//! # Library Use
//!
//! ```no_run
//! use contentpress::{config::Config, pipeline::Pipeline};
//!
//! # async fn demo() -> Result<(), contentpress::error::BuildError> {
//! let config = Config::load(std::path::Path::new("contentpress.toml"))?;
//! let report = Pipeline::new(config)
//!     .filename_builder("post", |entry| Ok(format!("blog/{}.html", entry.id)))
//!     .build()
//!     .await?;
//! println!("wrote {} files", report.written.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Design Decisions
//!
//! ## Filters Select Listings, Not Pages
//!
//! An entry definition's `filter` never suppresses the entry's own page. It
//! only decides whether listings may include the entry. A page that exists
//! but is unlisted is easier to debug than one that silently vanished.
//!
//! ## Optional Default Templates
//!
//! Per-entry records use their content type id as template name. If no such
//! template exists the record keeps its plain title as contents, which is
//! enough for a first build against a new space.

pub mod config;
pub mod contentful;
pub mod error;
pub mod fileset;
pub mod filter;
pub mod listing;
pub mod mapper;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
