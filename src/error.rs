//! Error types shared across pipeline stages.
//!
//! Every error is fatal: the first one aborts the build and nothing is
//! written. [`BuildError`] is what [`Pipeline::build`](crate::pipeline::Pipeline::build)
//! returns; it wraps the per-stage errors verbatim.

use crate::config::ConfigError;
use crate::contentful::FetchError;
use thiserror::Error;

/// Failures while turning entries into files or rendering them.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("entry {entry_id} has no field '{field}'")]
    MissingField { entry_id: String, field: String },
    #[error("invalid output path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("duplicate output path: {0}")]
    DuplicatePath(String),
    #[error("no filename builder named '{0}'")]
    UnknownBuilder(String),
    #[error("no entry '{id}' of content type '{content_type}'")]
    EntryNotFound { content_type: String, id: String },
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    #[error("failed to render {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: tera::Error,
    },
    #[error("failed to load templates: {0}")]
    TemplateLoad(#[from] tera::Error),
}

impl RenderError {
    pub(crate) fn missing_field(entry_id: &str, field: &str) -> Self {
        RenderError::MissingField {
            entry_id: entry_id.to_string(),
            field: field.to_string(),
        }
    }
}

/// Top-level build failure.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
