//! Build orchestration.
//!
//! ```text
//! load src/ → fetch entries → markdown → map entries → listings → render → write dest/
//! ```
//!
//! Every stage works on the in-memory [`FileSet`]. The destination is only
//! touched once all stages have succeeded, so a failed build leaves it as it
//! was.

use crate::config::{Config, ConfigError};
use crate::error::{BuildError, RenderError};
use crate::fileset::FileSet;
use crate::listing::assemble_listing;
use crate::mapper::map_entries;
use crate::naming::{FilenameBuilders, PathStrategy};
use crate::render::{Renderer, markdown_pass};
use crate::source;
use crate::types::{Entry, RecordKind};
use std::path::PathBuf;
use tracing::info;

/// A configured build. Cheap to construct; nothing runs until
/// [`run`](Self::run) or [`build`](Self::build).
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    custom_builders: FilenameBuilders,
}

/// What a build produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub dest: PathBuf,
    /// Entries fetched or read.
    pub entries: usize,
    /// Per-entry output paths, in staging order.
    pub entry_pages: Vec<String>,
    /// Listing output paths, in definition order.
    pub listings: Vec<String>,
    /// Source-tree files passed through to the output.
    pub source_files: usize,
    /// Records a template or layout was applied to.
    pub rendered: usize,
    /// Files written under `dest`.
    pub written: Vec<PathBuf>,
}

/// Staged output of a successful run.
#[derive(Debug)]
pub struct Staged {
    pub files: FileSet,
    pub entries: usize,
    pub rendered: usize,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            custom_builders: FilenameBuilders::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `builder` under `name`. Entry definitions use the builder
    /// registered under their content type id, or the one their
    /// `filename_builder` names. Takes precedence over permalinks and over a
    /// `[filename_builders]` pattern of the same name.
    pub fn filename_builder<F>(mut self, name: &str, builder: F) -> Self
    where
        F: Fn(&Entry) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.custom_builders.insert_fn(name, builder);
        self
    }

    /// Validate configuration, builder names and templates without fetching
    /// or writing.
    pub fn check(&self) -> Result<(), BuildError> {
        self.config.validate()?;
        let builders = self.builders()?;
        for def in self.config.entry_definitions() {
            PathStrategy::for_definition(&def, &builders)?;
        }
        Renderer::load(&self.config.templates)?;
        Ok(())
    }

    /// Run every stage in memory and return the staged files.
    pub async fn run(&self) -> Result<Staged, BuildError> {
        let config = &self.config;
        config.validate()?;
        let builders = self.builders()?;
        let renderer = Renderer::load(&config.templates)?;

        let mut files = FileSet::load(&config.src)?;
        let entries = source::fetch_entries(config, &mut files).await?;
        info!(entries = entries.len(), local = config.is_local(), "entries ready");

        if config.markdown {
            markdown_pass(&mut files)?;
        }

        for def in config.entry_definitions() {
            for record in map_entries(&entries, &def, &builders)? {
                files.insert(record)?;
            }
        }

        // Listings only see per-entry records, so they are assembled against
        // the set before any of them is inserted.
        let listings = config
            .listings
            .iter()
            .map(|def| assemble_listing(&files, def))
            .collect::<Result<Vec<_>, _>>()?;
        for record in listings {
            files.insert(record)?;
        }

        let rendered = renderer.render_all(&mut files)?;
        Ok(Staged {
            files,
            entries: entries.len(),
            rendered,
        })
    }

    /// Run every stage and write the result to `dest`.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let staged = self.run().await?;
        let written = staged.files.write(&self.config.dest, self.config.clean)?;
        let report = BuildReport::new(&self.config.dest, &staged, written);
        info!(
            dest = %report.dest.display(),
            files = report.written.len(),
            "build complete"
        );
        Ok(report)
    }

    fn builders(&self) -> Result<FilenameBuilders, ConfigError> {
        let mut builders = FilenameBuilders::from_patterns(&self.config.filename_builders)
            .map_err(|e| ConfigError::Validation(format!("filename_builders: {e}")))?;
        builders.merge(&self.custom_builders);
        Ok(builders)
    }
}

impl BuildReport {
    fn new(dest: &std::path::Path, staged: &Staged, written: Vec<PathBuf>) -> Self {
        let paths_of = |kind: RecordKind| -> Vec<String> {
            staged
                .files
                .iter()
                .filter(|r| r.metadata.kind == kind)
                .map(|r| r.path.clone())
                .collect()
        };
        Self {
            dest: dest.to_path_buf(),
            entries: staged.entries,
            entry_pages: paths_of(RecordKind::Entry),
            listings: paths_of(RecordKind::Listing),
            source_files: staged.files.iter().filter(|r| !r.is_generated()).count(),
            rendered: staged.rendered,
            written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntryDefinition, ListingDefinition};
    use std::fs;
    use tempfile::TempDir;

    fn local_site(tmp: &TempDir) -> Config {
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("post")).unwrap();
        fs::write(
            src.join("post/rabbit.md"),
            "---\ncontentful:\n  id: rabbit\n  fields:\n    title: Down the Rabbit Hole\n---\n",
        )
        .unwrap();
        fs::write(src.join("index.md"), "Home").unwrap();
        Config {
            src,
            dest: tmp.path().join("build"),
            templates: tmp.path().join("templates"),
            entries: vec![EntryDefinition::new("post")],
            listings: vec![ListingDefinition::new("posts.html", &["post"])],
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn run_stages_without_writing() {
        let tmp = TempDir::new().unwrap();
        let config = local_site(&tmp);
        let dest = config.dest.clone();

        let staged = Pipeline::new(config).run().await.unwrap();

        assert_eq!(staged.files.paths(), vec!["index.html", "rabbit.html", "posts.html"]);
        assert_eq!(staged.entries, 1);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn build_reports_outputs() {
        let tmp = TempDir::new().unwrap();
        let report = Pipeline::new(local_site(&tmp)).build().await.unwrap();

        assert_eq!(report.entries, 1);
        assert_eq!(report.entry_pages, vec!["rabbit.html"]);
        assert_eq!(report.listings, vec!["posts.html"]);
        assert_eq!(report.source_files, 1);
        assert_eq!(report.rendered, 0);
        assert_eq!(report.written.len(), 3);
        assert_eq!(
            fs::read_to_string(report.dest.join("posts.html")).unwrap(),
            "Down the Rabbit Hole"
        );
    }

    #[tokio::test]
    async fn custom_builder_overrides_pattern() {
        let tmp = TempDir::new().unwrap();
        let mut config = local_site(&tmp);
        config
            .filename_builders
            .insert("post".into(), "pattern-{id}.html".into());

        let staged = Pipeline::new(config)
            .filename_builder("post", |e| Ok(format!("closure/{}.html", e.id)))
            .run()
            .await
            .unwrap();
        assert!(staged.files.contains("closure/rabbit.html"));
    }

    #[tokio::test]
    async fn colliding_paths_fail_before_writing() {
        let tmp = TempDir::new().unwrap();
        let mut config = local_site(&tmp);
        config.listings = vec![ListingDefinition::new("rabbit.html", &["post"])];
        let dest = config.dest.clone();

        let err = Pipeline::new(config).build().await.unwrap_err();
        assert!(matches!(err, BuildError::Render(RenderError::DuplicatePath(ref p)) if p == "rabbit.html"));
        assert!(!dest.exists());
    }

    #[test]
    fn check_reports_invalid_config() {
        let config = Config {
            entry_key: String::new(),
            ..Config::default()
        };
        assert!(matches!(Pipeline::new(config).check(), Err(BuildError::Config(_))));
    }

    #[test]
    fn check_reports_unknown_builder_name() {
        let tmp = TempDir::new().unwrap();
        let mut config = local_site(&tmp);
        config.entries[0].filename_builder = Some("aldente".into());

        let err = Pipeline::new(config.clone()).check().unwrap_err();
        assert!(matches!(err, BuildError::Render(RenderError::UnknownBuilder(ref n)) if n == "aldente"));

        let pipeline = Pipeline::new(config).filename_builder("aldente", |e| Ok(format!("aldente-{}.html", e.id)));
        assert!(pipeline.check().is_ok());
    }

    #[tokio::test]
    async fn same_content_type_under_two_definitions() {
        let tmp = TempDir::new().unwrap();
        let mut config = local_site(&tmp);
        let mut permalink = EntryDefinition::new("post");
        permalink.permalink = true;
        config.entries.push(permalink);

        let staged = Pipeline::new(config).run().await.unwrap();

        assert!(staged.files.contains("rabbit.html"));
        assert!(staged.files.contains("rabbit/index.html"));
        let posts = staged.files.get("posts.html").unwrap();
        assert_eq!(posts.contents_str(), "Down the Rabbit Hole");
    }

    #[test]
    fn check_loads_templates() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("templates")).unwrap();
        fs::write(tmp.path().join("templates/bad.html"), "{{ unclosed").unwrap();
        let config = Config {
            templates: tmp.path().join("templates"),
            ..Config::default()
        };
        assert!(matches!(
            Pipeline::new(config).check(),
            Err(BuildError::Render(RenderError::TemplateLoad(_)))
        ));
    }
}
