//! HTTP client for the Open Library search API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{CatalogHit, CatalogSearch, SearchError};

const SEARCH_FIELDS: &str = "key,title,author_name,isbn,cover_i";

#[derive(Debug, Clone)]
pub struct OpenLibraryConfig {
    /// Base URL of the search API, e.g. "https://openlibrary.org".
    pub search_base_url: String,
    /// Base URL of the cover image service, e.g. "https://covers.openlibrary.org".
    pub covers_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://openlibrary.org".to_string(),
            covers_base_url: "https://covers.openlibrary.org".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("bookshelf-server/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

#[derive(Deserialize)]
struct SearchDoc {
    key: Option<String>,
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
    cover_i: Option<i64>,
}

/// Tail of a slash-delimited catalog key: "/works/OL123W" -> "OL123W".
fn external_id_from_key(key: &str) -> Option<&str> {
    key.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// Prefers a 13-character code, then the first 10-character one.
fn pick_isbn(isbns: &[String]) -> Option<String> {
    isbns
        .iter()
        .find(|isbn| isbn.chars().count() == 13)
        .or_else(|| isbns.iter().find(|isbn| isbn.chars().count() == 10))
        .cloned()
}

fn cover_url(covers_base_url: &str, cover_id: Option<i64>) -> Option<String> {
    cover_id
        .filter(|id| *id > 0)
        .map(|id| format!("{}/b/id/{}-M.jpg", covers_base_url, id))
}

fn normalize_doc(doc: SearchDoc, covers_base_url: &str) -> Option<CatalogHit> {
    let external_id = doc.key.as_deref().and_then(external_id_from_key)?.to_string();
    let title = doc.title.filter(|t| !t.trim().is_empty())?;
    Some(CatalogHit {
        external_id,
        title,
        author: doc.author_name.join(", "),
        isbn: pick_isbn(&doc.isbn),
        cover_url: cover_url(covers_base_url, doc.cover_i),
    })
}

#[derive(Clone)]
pub struct OpenLibraryClient {
    client: Client,
    search_base_url: String,
    covers_base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: OpenLibraryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            search_base_url: config.search_base_url.trim_end_matches('/').to_string(),
            covers_base_url: config.covers_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogSearch for OpenLibraryClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogHit>, SearchError> {
        let url = format!("{}/search.json", self.search_base_url);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("fields", SEARCH_FIELDS),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                warn!("Open Library request failed: {}", err);
                SearchError::Upstream(if err.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", err)
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Open Library search failed with status: {}", status);
            return Err(SearchError::Upstream(format!(
                "search request failed with status: {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|err| {
            warn!("Failed to read Open Library response: {}", err);
            SearchError::Upstream(format!("failed to read response: {}", err))
        })?;
        let parsed: SearchResponse = serde_json::from_slice(&body).map_err(|err| {
            warn!("Failed to decode Open Library response: {}", err);
            SearchError::Decode(err.to_string())
        })?;

        let total = parsed.docs.len();
        let hits: Vec<CatalogHit> = parsed
            .docs
            .into_iter()
            .filter_map(|doc| normalize_doc(doc, &self.covers_base_url))
            .collect();
        debug!("Open Library returned {} docs, {} usable", total, hits.len());
        Ok(hits)
    }
}
