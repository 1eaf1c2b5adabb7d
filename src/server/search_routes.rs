//! Catalog search API routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::{method_not_allowed, parse_query, ApiError};
use super::state::{GuardedSearchReconciler, ServerState};
use crate::catalog_search::SearchResult;

#[derive(Deserialize, Debug)]
struct SearchParams {
    q: Option<String>,
}

async fn search_catalog(
    State(reconciler): State<GuardedSearchReconciler>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let query = parse_query(query)?.q.unwrap_or_default();
    Ok(Json(reconciler.search(&query).await?))
}

/// Mounted next to the book routes, so `/search` wins over `/{id}`.
pub fn make_search_routes(state: ServerState) -> Router {
    Router::new()
        .route("/search", get(search_catalog))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}
