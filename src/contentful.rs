//! Remote entry source: the Contentful Content Delivery API.
//!
//! One `GET {base_url}/spaces/{space}/environments/{env}/entries` per content
//! type, authenticated with a bearer token. Responses are normalized into
//! [`Entry`] values; nothing downstream sees the wire format.

use crate::config::ContentfulConfig;
use crate::types::Entry;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("access token rejected for space {space_id} ({status})")]
    Unauthorized { space_id: String, status: StatusCode },
    #[error("unexpected status {status} fetching '{content_type}': {body}")]
    Status {
        content_type: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed response for '{content_type}': {source}")]
    Decode {
        content_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    items: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    sys: RawSys,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSys {
    id: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    content_type: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    sys: LinkSys,
}

#[derive(Debug, Deserialize)]
struct LinkSys {
    id: String,
}

pub struct ContentfulClient {
    http: reqwest::Client,
    base_url: Url,
    space_id: String,
    environment: String,
    access_token: String,
    locale: Option<String>,
}

impl ContentfulClient {
    pub fn new(config: &ContentfulConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("contentpress/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            space_id: config.space_id.clone(),
            environment: config.environment.clone(),
            access_token: config.access_token.clone().unwrap_or_default(),
            locale: config.locale.clone(),
        })
    }

    fn entries_url(&self, content_type: &str) -> Result<Url, FetchError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/spaces/{}/environments/{}/entries",
            self.space_id, self.environment
        ))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("content_type", content_type);
            if let Some(locale) = &self.locale {
                query.append_pair("locale", locale);
            }
        }
        Ok(url)
    }

    /// Fetch every entry of `content_type`, in the order the API returns them.
    pub async fn fetch_entries(&self, content_type: &str) -> Result<Vec<Entry>, FetchError> {
        let url = self.entries_url(content_type)?;
        debug!(%url, "requesting entries");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized {
                space_id: self.space_id.clone(),
                status,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                content_type: content_type.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: EntriesResponse =
            serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
                content_type: content_type.to_string(),
                source,
            })?;

        let total = parsed.total.unwrap_or(0);
        if total > parsed.items.len() {
            warn!(
                content_type,
                total,
                received = parsed.items.len(),
                "response is paginated; only the first page is used"
            );
        }

        let entries: Vec<Entry> = parsed
            .items
            .into_iter()
            .map(|raw| normalize(raw, content_type))
            .collect();
        info!(content_type, count = entries.len(), "fetched entries");
        Ok(entries)
    }
}

fn normalize(raw: RawEntry, queried_type: &str) -> Entry {
    Entry {
        id: raw.sys.id,
        content_type: raw
            .sys
            .content_type
            .map(|link| link.sys.id)
            .unwrap_or_else(|| queried_type.to_string()),
        fields: raw.fields,
        locale: raw.sys.locale,
    }
}
