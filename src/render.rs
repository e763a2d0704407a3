//! Render stage: markdown conversion, templates and layouts.
//!
//! Runs after mapping and listing assembly, over the whole file set:
//!
//! 1. **Markdown**: source `.md` files become `.html` (see [`markdown_pass`]).
//! 2. **Template**: a record with a template is rendered with Tera; its
//!    current contents are available as `contents`.
//! 3. **Layout**: a record with a layout is then wrapped by it, again with
//!    the previous output as `contents`.
//!
//! Templates are every file under the templates directory, named by their
//! path relative to it (`post.html`, `partials/nav.html`). Autoescaping is
//! off: `contents` is already HTML.
//!
//! A per-entry record's template defaults to its content type id. That
//! default is optional: without a matching template the record passes
//! through unchanged. Any other template or layout that is missing fails the
//! build.
//!
//! ## Template Context
//!
//! | Key            | Value                                              |
//! |----------------|----------------------------------------------------|
//! | `contents`     | Record contents before this step                   |
//! | `title`        | Display title, listing title or front-matter title |
//! | `path`         | Output path                                        |
//! | `content_type` | Content type id, per-entry records only            |
//! | `locale`       | Entry or listing locale                            |
//! | *data keys*    | Entry definition `key`, listing `key`, front matter |

use crate::error::RenderError;
use crate::fileset::FileSet;
use crate::types::{FileRecord, RecordKind};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::collections::HashSet;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

/// Convert source `.md` records to HTML and rename them to `.html`.
pub fn markdown_pass(files: &mut FileSet) -> Result<usize, RenderError> {
    let targets: Vec<String> = files
        .iter()
        .filter(|r| r.metadata.kind == RecordKind::Source && r.path.ends_with(".md"))
        .map(|r| r.path.clone())
        .collect();

    for path in &targets {
        let stem = path.strip_suffix(".md").unwrap_or(path);
        let html_path = format!("{stem}.html");
        files.rename(path, &html_path)?;
        if let Some(record) = files.iter_mut().find(|r| r.path == html_path) {
            let html = markdown_to_html(&record.contents_str());
            record.contents = html.into_bytes();
        }
    }
    debug!(count = targets.len(), "converted markdown");
    Ok(targets.len())
}

pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 2);
    md_html::push_html(&mut html, parser);
    html
}

/// Loaded templates.
pub struct Renderer {
    tera: Tera,
    names: HashSet<String>,
}

impl Renderer {
    /// Load every file under `dir` as a template. A missing directory loads
    /// nothing.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let mut tera = if dir.is_dir() {
            let glob = format!("{}/**/*", dir.display());
            Tera::new(&glob)?
        } else {
            debug!(dir = %dir.display(), "no templates directory");
            Tera::default()
        };
        tera.autoescape_on(vec![]);
        let names = tera.get_template_names().map(String::from).collect();
        Ok(Self { tera, names })
    }

    /// Renderer over in-memory templates, `(name, source)` pairs.
    #[cfg(test)]
    pub(crate) fn from_templates(templates: &[(&str, &str)]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates.to_vec())?;
        let names = tera.get_template_names().map(String::from).collect();
        Ok(Self { tera, names })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Apply templates and layouts to every record. Returns how many records
    /// were rendered.
    pub fn render_all(&self, files: &mut FileSet) -> Result<usize, RenderError> {
        let mut rendered = 0;
        for record in files.iter_mut() {
            if self.render_record(record)? {
                rendered += 1;
            }
        }
        debug!(rendered, "applied templates");
        Ok(rendered)
    }

    /// Render one record in place. Returns whether anything was applied.
    pub fn render_record(&self, record: &mut FileRecord) -> Result<bool, RenderError> {
        let template = match &record.metadata.template {
            Some(name) if self.has_template(name) => Some(name.clone()),
            Some(name) if is_default_template(record, name) => None,
            Some(name) => return Err(RenderError::TemplateNotFound(name.clone())),
            None => None,
        };
        let layout = match &record.metadata.layout {
            Some(name) if self.has_template(name) => Some(name.clone()),
            Some(name) => return Err(RenderError::TemplateNotFound(name.clone())),
            None => None,
        };
        if template.is_none() && layout.is_none() {
            return Ok(false);
        }

        let mut context = base_context(record);
        let mut contents = record.contents_str().into_owned();
        for name in template.iter().chain(layout.iter()) {
            context.insert("contents", &contents);
            contents = self
                .tera
                .render(name, &context)
                .map_err(|source| RenderError::Template {
                    path: record.path.clone(),
                    source,
                })?;
        }
        record.contents = contents.into_bytes();
        Ok(true)
    }
}

/// Per-entry records fall back to their content type id as template name;
/// that template may be absent.
fn is_default_template(record: &FileRecord, name: &str) -> bool {
    record.metadata.kind == RecordKind::Entry
        && record.metadata.content_type.as_deref() == Some(name)
}

fn base_context(record: &FileRecord) -> Context {
    let mut context = Context::new();
    for (key, value) in &record.metadata.data {
        context.insert(key.as_str(), value);
    }
    let meta = &record.metadata;
    context.insert("title", &meta.title);
    context.insert("path", &record.path);
    context.insert("content_type", &meta.content_type);
    context.insert("locale", &meta.locale);
    context
}
