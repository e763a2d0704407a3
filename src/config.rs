//! Build configuration.
//!
//! Loaded from `contentpress.toml`, validated before anything else runs so a
//! typo fails the build before the first request is sent.
//!
//! ## Configuration Options
//!
//! ```toml
//! src = "src"                    # Source tree (pass-through files, local entries)
//! dest = "build"                 # Output directory
//! templates = "templates"        # Tera templates, looked up by relative path
//! clean = true                   # Remove dest before writing
//! markdown = true                # Convert source .md files to .html
//! entry_key = "contentful"       # Front-matter key holding local entries
//! entry_extension = "md"         # Extension of local entry files
//!
//! [contentful]                   # Absent = local mode
//! space_id = "w7sdyslol3fu"
//! access_token = "..."           # Or CONTENTFUL_ACCESS_TOKEN
//! content_type = "..."           # Extra content type to query
//! environment = "master"
//! base_url = "https://cdn.contentful.com"
//! timeout_secs = 30
//!
//! [filename_builders]            # Keyed by content type or builder name
//! aldente = "aldente-{title|slug}.html"
//!
//! [[entries]]
//! content_type = "2wKn6yEnZewu2SCCkus4as"
//! template = "post.html"
//! permalink = true
//!
//! [[entries]]                    # One entry at a fixed path
//! content_type = "2wKn6yEnZewu2SCCkus4as"
//! entry_id = "A96usFSlY4G0W4kwAqswk"
//! path = "single-post.html"
//!
//! [[listings]]
//! path = "posts.html"
//! content_types = ["2wKn6yEnZewu2SCCkus4as"]
//! template = "posts.html"
//! limit = 10
//! ```
//!
//! Relative paths resolve against the directory holding the config file.
//! Unknown keys are rejected to catch typos early.

use crate::filter::FieldFilter;
use crate::naming::FilenamePattern;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "contentpress.toml";
pub const ACCESS_TOKEN_ENV: &str = "CONTENTFUL_ACCESS_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("no content types configured: add an [[entries]] definition or contentful.content_type")]
    NoContentTypes,
    #[error("invalid front matter in {path}: {message}")]
    FrontMatter { path: String, message: String },
    #[error(
        "no local entries for content type '{content_type}': expected {dir}/*.{extension} with a '{entry_key}' front-matter key"
    )]
    NoLocalEntries {
        content_type: String,
        dir: String,
        extension: String,
        entry_key: String,
    },
}

/// Whole-run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub templates: PathBuf,
    pub clean: bool,
    pub markdown: bool,
    pub entry_key: String,
    pub entry_extension: String,
    /// Remote settings. `None` selects local mode.
    pub contentful: Option<ContentfulConfig>,
    /// Content type → filename pattern.
    pub filename_builders: BTreeMap<String, String>,
    pub entries: Vec<EntryDefinition>,
    pub listings: Vec<ListingDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            dest: PathBuf::from("build"),
            templates: PathBuf::from("templates"),
            clean: true,
            markdown: true,
            entry_key: "contentful".to_string(),
            entry_extension: "md".to_string(),
            contentful: None,
            filename_builders: BTreeMap::new(),
            entries: Vec::new(),
            listings: Vec::new(),
        }
    }
}

/// Content Delivery API settings.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentfulConfig {
    pub space_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Forwarded as the `locale` query parameter.
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_environment() -> String {
    "master".to_string()
}

fn default_base_url() -> String {
    "https://cdn.contentful.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ContentfulConfig {
    pub fn new(space_id: &str, access_token: &str) -> Self {
        Self {
            space_id: space_id.to_string(),
            access_token: Some(access_token.to_string()),
            content_type: None,
            environment: default_environment(),
            base_url: default_base_url(),
            locale: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keeps the token out of logs and panics.
impl fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("space_id", &self.space_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("content_type", &self.content_type)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("locale", &self.locale)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// How entries of one content type become files.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDefinition {
    pub content_type: String,
    /// Restrict the definition to this one entry.
    #[serde(default)]
    pub entry_id: Option<String>,
    /// Fixed output path. Only valid together with `entry_id`.
    #[serde(default)]
    pub path: Option<String>,
    /// Name of a registered filename builder; the content type id when unset.
    #[serde(default)]
    pub filename_builder: Option<String>,
    /// Template data key the raw entry is exposed under.
    #[serde(default = "default_entry_key")]
    pub key: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub parent_dir: String,
    /// Emit `<id>/index.<ext>` instead of `<id>.<ext>`.
    #[serde(default)]
    pub permalink: bool,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    /// Entries failing the filter still get a page but are left out of listings.
    #[serde(default)]
    pub filter: Vec<FieldFilter>,
}

fn default_entry_key() -> String {
    "entry".to_string()
}

fn default_extension() -> String {
    "html".to_string()
}

fn default_title_field() -> String {
    "title".to_string()
}

impl EntryDefinition {
    /// Definition with every option at its default.
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            entry_id: None,
            path: None,
            filename_builder: None,
            key: default_entry_key(),
            extension: default_extension(),
            parent_dir: String::new(),
            permalink: false,
            template: None,
            layout: None,
            title_field: default_title_field(),
            order_by: None,
            filter: Vec::new(),
        }
    }

    /// Template name attached to records; the content type id when unset.
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.content_type)
    }

    /// Key the definition's filename builder is registered under.
    pub fn builder_name(&self) -> &str {
        self.filename_builder.as_deref().unwrap_or(&self.content_type)
    }

    /// Whether the definition renders one named entry rather than all
    /// entries of its type.
    pub fn is_single(&self) -> bool {
        self.entry_id.is_some()
    }
}

/// An aggregate page over one or more content types.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingDefinition {
    pub path: String,
    pub content_types: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Template data key the entry array is exposed under.
    #[serde(default = "default_listing_key")]
    pub key: String,
    #[serde(default)]
    pub filter: Vec<FieldFilter>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_listing_key() -> String {
    "entries".to_string()
}

impl ListingDefinition {
    pub fn new(path: &str, content_types: &[&str]) -> Self {
        Self {
            path: path.to_string(),
            content_types: content_types.iter().map(|s| s.to_string()).collect(),
            template: None,
            layout: None,
            title: None,
            key: default_listing_key(),
            filter: Vec::new(),
            locale: None,
            order_by: None,
            limit: None,
        }
    }
}

/// Sort key: `"title"` ascending, `"-title"` descending.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl TryFrom<String> for OrderBy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (field, descending) = match value.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (value.as_str(), false),
        };
        if field.is_empty() {
            return Err(format!("invalid order_by '{value}': missing field name"));
        }
        Ok(OrderBy {
            field: field.to_string(),
            descending,
        })
    }
}

impl Config {
    /// Parse and validate a config from TOML text. Paths stay as written.
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, resolve relative paths against its directory, fill the
    /// access token from the environment when the file omits it, and validate.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        if let Some(contentful) = config.contentful.as_mut()
            && contentful.access_token.is_none()
        {
            contentful.access_token = std::env::var(ACCESS_TOKEN_ENV).ok();
        }
        config.validate()?;
        Ok(config)
    }

    /// Make `src`, `dest` and `templates` absolute-or-relative-to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.src, &mut self.dest, &mut self.templates] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Whether entries come from the local tree instead of the remote API.
    pub fn is_local(&self) -> bool {
        self.contentful.is_none()
    }

    /// Every content type the run touches, in first-seen order: entry
    /// definitions, then listing content types, then `contentful.content_type`.
    pub fn content_types(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let extra = self.contentful.as_ref().and_then(|c| c.content_type.as_ref());
        self.entries
            .iter()
            .map(|d| &d.content_type)
            .chain(self.listings.iter().flat_map(|l| l.content_types.iter()))
            .chain(extra)
            .filter(|ct| seen.insert(ct.as_str()))
            .cloned()
            .collect()
    }

    /// Entry definitions including the implicit default one for a
    /// `contentful.content_type` that has no explicit definition.
    pub fn entry_definitions(&self) -> Vec<EntryDefinition> {
        let mut defs = self.entries.clone();
        if let Some(ct) = self.contentful.as_ref().and_then(|c| c.content_type.as_ref())
            && !defs.iter().any(|d| &d.content_type == ct)
        {
            defs.push(EntryDefinition::new(ct));
        }
        defs
    }

    /// Validate every option. Runs before any I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));

        if self.entry_key.is_empty() {
            return invalid("entry_key must not be empty".into());
        }
        if self.entry_extension.is_empty() || self.entry_extension.contains(['.', '/']) {
            return invalid(format!(
                "entry_extension must be a bare extension like \"md\", got {:?}",
                self.entry_extension
            ));
        }

        if let Some(contentful) = &self.contentful {
            if contentful.space_id.is_empty() {
                return invalid("contentful.space_id must not be empty".into());
            }
            if contentful.access_token.as_deref().is_none_or(str::is_empty) {
                return invalid(format!(
                    "contentful.access_token is required (or set {ACCESS_TOKEN_ENV})"
                ));
            }
            if contentful.timeout_secs == 0 {
                return invalid("contentful.timeout_secs must be greater than 0".into());
            }
            if let Err(e) = url::Url::parse(&contentful.base_url) {
                return invalid(format!("contentful.base_url is not a URL: {e}"));
            }
        }

        for (content_type, pattern) in &self.filename_builders {
            if let Err(e) = FilenamePattern::parse(pattern) {
                return invalid(format!("filename_builders.{content_type}: {e}"));
            }
        }

        for (i, def) in self.entries.iter().enumerate() {
            if def.content_type.is_empty() {
                return invalid(format!("entries[{i}].content_type must not be empty"));
            }
            if def.key.is_empty() {
                return invalid(format!("entries[{i}].key must not be empty"));
            }
            if def.extension.is_empty() || def.extension.contains(['.', '/']) {
                return invalid(format!(
                    "entries[{i}].extension must be a bare extension like \"html\", got {:?}",
                    def.extension
                ));
            }
            if let Err(reason) = check_relative(&def.parent_dir) {
                return invalid(format!("entries[{i}].parent_dir {reason}"));
            }
            if def.entry_id.as_deref().is_some_and(str::is_empty) {
                return invalid(format!("entries[{i}].entry_id must not be empty"));
            }
            if let Some(path) = &def.path {
                if def.entry_id.is_none() {
                    return invalid(format!("entries[{i}].path requires entry_id"));
                }
                if path.is_empty() {
                    return invalid(format!("entries[{i}].path must not be empty"));
                }
                if let Err(reason) = check_relative(path) {
                    return invalid(format!("entries[{i}].path {reason}"));
                }
            }
            if def.filename_builder.as_deref().is_some_and(str::is_empty) {
                return invalid(format!("entries[{i}].filename_builder must not be empty"));
            }
            for filter in &def.filter {
                if let Err(e) = filter.validate() {
                    return invalid(format!("entries[{i}]: {e}"));
                }
            }
        }

        let defined: HashSet<String> = self
            .entry_definitions()
            .into_iter()
            .map(|d| d.content_type)
            .collect();
        let mut listing_paths = HashSet::new();
        for (i, listing) in self.listings.iter().enumerate() {
            if listing.path.is_empty() {
                return invalid(format!("listings[{i}].path must not be empty"));
            }
            if let Err(reason) = check_relative(&listing.path) {
                return invalid(format!("listings[{i}].path {reason}"));
            }
            if !listing_paths.insert(listing.path.as_str()) {
                return invalid(format!("listings[{i}].path '{}' is used twice", listing.path));
            }
            if listing.content_types.is_empty() {
                return invalid(format!("listings[{i}].content_types must not be empty"));
            }
            if let Some(ct) = listing.content_types.iter().find(|ct| !defined.contains(*ct)) {
                return invalid(format!(
                    "listings[{i}] includes content type '{ct}' which has no [[entries]] definition"
                ));
            }
            if listing.key.is_empty() {
                return invalid(format!("listings[{i}].key must not be empty"));
            }
            for filter in &listing.filter {
                if let Err(e) = filter.validate() {
                    return invalid(format!("listings[{i}]: {e}"));
                }
            }
        }
        Ok(())
    }
}

/// Reject absolute paths and `..` components.
fn check_relative(path: &str) -> Result<(), &'static str> {
    let p = Path::new(path);
    if p.is_absolute() || path.starts_with('/') {
        return Err("must be relative");
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err("must not contain '..'");
    }
    Ok(())
}

/// Returns a fully-commented stock `contentpress.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# contentpress configuration
# ==========================
# Paths are relative to this file. Unknown keys cause an error.

# Source tree: copied to dest, Markdown converted, local entries read from here.
src = "src"

# Output directory.
dest = "build"

# Tera templates, referenced by their path relative to this directory.
templates = "templates"

# Remove dest before writing.
clean = true

# Convert source .md files to .html.
markdown = true

# Local mode only: entries live in <src>/<content_type>/*.<entry_extension>
# and carry their data under this front-matter key.
entry_key = "contentful"
entry_extension = "md"

# ---------------------------------------------------------------------------
# Remote entries. Remove this table to read entries from the source tree.
# ---------------------------------------------------------------------------
# [contentful]
# space_id = "your-space-id"
# access_token = "..."            # or set CONTENTFUL_ACCESS_TOKEN
# content_type = "post"           # extra content type to query
# environment = "master"
# base_url = "https://cdn.contentful.com"
# locale = "en-US"
# timeout_secs = 30

# ---------------------------------------------------------------------------
# Custom file names, keyed by content type or by a name that [[entries]]
# refer to with filename_builder. Placeholders: {id}, {content_type},
# {locale}, {<field>}, {<field>|slug}. Wins over permalink and default names.
# ---------------------------------------------------------------------------
[filename_builders]
# post = "blog/{title|slug}.html"

# ---------------------------------------------------------------------------
# One page per entry.
# ---------------------------------------------------------------------------
# [[entries]]
# content_type = "post"
# entry_id = "..."                # only this entry
# path = "featured.html"          # fixed path, requires entry_id
# filename_builder = "post"       # builder name, default: the content type id
# key = "entry"                   # template variable holding the raw entry
# extension = "html"
# parent_dir = ""
# permalink = false               # true: <id>/index.<ext>
# template = "post.html"          # default: the content type id
# layout = "base.html"
# title_field = "title"
# order_by = "-date"              # field, '-' for descending
# filter = [{ field = "draft", op = "equals", value = false }]

# ---------------------------------------------------------------------------
# Aggregate pages.
# ---------------------------------------------------------------------------
# [[listings]]
# path = "posts.html"
# content_types = ["post"]
# template = "posts.html"
# key = "entries"                 # template variable holding the entry array
# locale = "en-US"
# order_by = "title"
# limit = 10
# filter = [{ field = "title", op = "contains", value = "Rabbit" }]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_local_mode() {
        let config = Config::default();
        assert!(config.is_local());
        assert_eq!(config.src, PathBuf::from("src"));
        assert_eq!(config.dest, PathBuf::from("build"));
        assert_eq!(config.entry_key, "contentful");
        assert_eq!(config.entry_extension, "md");
        assert!(config.clean);
        assert!(config.markdown);
    }

    #[test]
    fn stock_config_parses_and_validates() {
        let config = Config::from_toml_str(stock_config_toml()).unwrap();
        assert!(config.entries.is_empty());
        assert!(config.is_local());
    }

    #[test]
    fn parse_entry_definition_defaults() {
        let config = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
"#,
        )
        .unwrap();
        let def = &config.entries[0];
        assert_eq!(def.extension, "html");
        assert_eq!(def.key, "entry");
        assert_eq!(def.title_field, "title");
        assert_eq!(def.template_name(), "post");
        assert!(!def.permalink);
    }

    #[test]
    fn parse_full_listing() {
        let config = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"

[[entries]]
content_type = "page"

[[listings]]
path = "posts.html"
content_types = ["post", "page"]
template = "posts.html"
locale = "en-US"
order_by = "-title"
limit = 1
filter = [{ field = "title", op = "contains", value = "Rabbit" }]
"#,
        )
        .unwrap();
        let listing = &config.listings[0];
        assert_eq!(listing.content_types, vec!["post", "page"]);
        assert_eq!(listing.limit, Some(1));
        assert_eq!(
            listing.order_by,
            Some(OrderBy {
                field: "title".into(),
                descending: true
            })
        );
        assert_eq!(listing.filter.len(), 1);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = Config::from_toml_str("entry_keys = \"typo\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));

        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
permalinks = true
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn contentful_requires_token() {
        let result = Config::from_toml_str(
            r#"
[contentful]
space_id = "w7sdyslol3fu"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("access_token")));
    }

    #[test]
    fn contentful_defaults() {
        let config = Config::from_toml_str(
            r#"
[contentful]
space_id = "w7sdyslol3fu"
access_token = "token"
"#,
        )
        .unwrap();
        let contentful = config.contentful.unwrap();
        assert_eq!(contentful.environment, "master");
        assert_eq!(contentful.base_url, "https://cdn.contentful.com");
        assert_eq!(contentful.timeout_secs, 30);
    }

    #[test]
    fn debug_redacts_token() {
        let contentful = ContentfulConfig::new("space", "super-secret");
        let debug = format!("{contentful:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn listing_needs_entry_definition() {
        let result = Config::from_toml_str(
            r#"
[[listings]]
path = "posts.html"
content_types = ["post"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("no [[entries]]")));
    }

    #[test]
    fn listing_may_use_contentful_content_type() {
        let config = Config::from_toml_str(
            r#"
[contentful]
space_id = "s"
access_token = "t"
content_type = "post"

[[listings]]
path = "posts.html"
content_types = ["post"]
"#,
        )
        .unwrap();
        let defs = config.entry_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].content_type, "post");
    }

    #[test]
    fn duplicate_listing_paths_rejected() {
        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"

[[listings]]
path = "posts.html"
content_types = ["post"]

[[listings]]
path = "posts.html"
content_types = ["post"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("used twice")));
    }

    #[test]
    fn extension_must_be_bare() {
        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
extension = ".html"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn parent_dir_must_stay_inside_dest() {
        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
parent_dir = "../outside"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("..")));
    }

    #[test]
    fn single_entry_definition() {
        let config = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
entry_id = "A96usFSlY4G0W4kwAqswk"
path = "single-post.html"
template = "single.html"
"#,
        )
        .unwrap();
        let def = &config.entries[0];
        assert!(def.is_single());
        assert_eq!(def.path.as_deref(), Some("single-post.html"));
        assert_eq!(def.builder_name(), "post");
    }

    #[test]
    fn fixed_path_requires_entry_id() {
        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
path = "single-post.html"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("requires entry_id")));
    }

    #[test]
    fn named_filename_builder() {
        let config = Config::from_toml_str(
            r#"
[filename_builders]
aldente = "aldente-{title|slug}.html"

[[entries]]
content_type = "post"
filename_builder = "aldente"
"#,
        )
        .unwrap();
        assert_eq!(config.entries[0].builder_name(), "aldente");
    }

    #[test]
    fn bad_filename_pattern_rejected() {
        let result = Config::from_toml_str(
            r#"
[filename_builders]
post = "post-{title.html"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("filename_builders.post")));
    }

    #[test]
    fn invalid_filter_rejected() {
        let result = Config::from_toml_str(
            r#"
[[entries]]
content_type = "post"
filter = [{ field = "title", op = "equals" }]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn order_by_rejects_bare_dash() {
        assert!(OrderBy::try_from("-".to_string()).is_err());
        let asc = OrderBy::try_from("date".to_string()).unwrap();
        assert!(!asc.descending);
    }

    #[test]
    fn content_types_in_first_seen_order() {
        let config = Config::from_toml_str(
            r#"
[contentful]
space_id = "s"
access_token = "t"
content_type = "extra"

[[entries]]
content_type = "post"

[[entries]]
content_type = "page"

[[listings]]
path = "all.html"
content_types = ["page", "post"]
"#,
        )
        .unwrap();
        assert_eq!(config.content_types(), vec!["post", "page", "extra"]);
    }

    #[test]
    fn load_resolves_paths_against_config_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "src = \"content\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.src, tmp.path().join("content"));
        assert_eq!(config.dest, tmp.path().join("build"));
        assert_eq!(config.templates, tmp.path().join("templates"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join(CONFIG_FILE));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
