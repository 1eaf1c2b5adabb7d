use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use super::{CatalogHit, CatalogSearch, SearchError};
use crate::book_store::{Book, BookStatus, BookStore};

/// A catalog hit annotated with the matching book of the collection, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_status: Option<BookStatus>,
}

impl SearchResult {
    fn from_hit(hit: CatalogHit, existing: Option<&Book>) -> Self {
        Self {
            external_id: hit.external_id,
            title: hit.title,
            author: hit.author,
            isbn: hit.isbn,
            cover_url: hit.cover_url,
            existing_id: existing.map(|book| book.id),
            existing_status: existing.map(|book| book.status),
        }
    }
}

/// Runs external searches and marks the hits already present in the collection.
pub struct SearchReconciler {
    search: Arc<dyn CatalogSearch>,
    store: Arc<dyn BookStore>,
    limit: usize,
}

impl SearchReconciler {
    pub fn new(search: Arc<dyn CatalogSearch>, store: Arc<dyn BookStore>, limit: usize) -> Self {
        Self {
            search,
            store,
            limit,
        }
    }

    /// Results keep the external service's relevance order. Any failure of the
    /// external call fails the whole search.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let hits = self.search.search(query, self.limit).await?;

        let books = self.store.get_books()?;
        let by_external_id: HashMap<&str, &Book> = books
            .iter()
            .map(|book| (book.external_id.as_str(), book))
            .collect();

        let results: Vec<SearchResult> = hits
            .into_iter()
            .map(|hit| {
                let existing = by_external_id.get(hit.external_id.as_str()).copied();
                SearchResult::from_hit(hit, existing)
            })
            .collect();

        debug!(
            "Search returned {} results, {} already in the collection",
            results.len(),
            results.iter().filter(|r| r.existing_id.is_some()).count()
        );
        Ok(results)
    }
}
