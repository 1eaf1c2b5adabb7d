//! External catalog search and reconciliation against the local collection.

mod open_library;
mod reconciler;

pub use open_library::{OpenLibraryClient, OpenLibraryConfig};
pub use reconciler::{SearchReconciler, SearchResult};

use crate::book_store::BookStoreError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing search query parameter 'q'")]
    EmptyQuery,

    /// The external service could not be reached, timed out, or answered with an error status.
    #[error("Search service unavailable: {0}")]
    Upstream(String),

    #[error("Invalid response from search service: {0}")]
    Decode(String),

    #[error(transparent)]
    Store(#[from] BookStoreError),
}

/// A normalised hit from the external catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHit {
    pub external_id: String,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
}

/// Free-text search against an external bibliographic service.
///
/// Implementations return hits in the service's relevance order and fail the
/// whole call on any transport or decoding problem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogHit>, SearchError>;
}
