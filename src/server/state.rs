use axum::extract::FromRef;

use crate::book_store::BookStore;
use crate::catalog_search::SearchReconciler;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedBookStore = Arc<dyn BookStore>;
pub type GuardedSearchReconciler = Arc<SearchReconciler>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub book_store: GuardedBookStore,
    pub search_reconciler: GuardedSearchReconciler,
}

impl FromRef<ServerState> for GuardedBookStore {
    fn from_ref(input: &ServerState) -> Self {
        input.book_store.clone()
    }
}

impl FromRef<ServerState> for GuardedSearchReconciler {
    fn from_ref(input: &ServerState) -> Self {
        input.search_reconciler.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
