use anyhow::{Context, Result};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::info;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
};

use super::{
    books_routes::make_books_routes, error::ApiError, log_requests,
    search_routes::make_search_routes, shelves_routes::make_shelves_routes, state::*,
    ServerConfig,
};
use crate::book_store::BookStore;
use crate::catalog_search::{CatalogSearch, SearchReconciler};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    };
    Json(stats)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

pub fn make_app(
    config: ServerConfig,
    book_store: Arc<dyn BookStore>,
    catalog_search: Arc<dyn CatalogSearch>,
) -> Result<Router> {
    let search_reconciler = Arc::new(SearchReconciler::new(
        catalog_search,
        book_store.clone(),
        config.search_limit,
    ));
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        book_store,
        search_reconciler,
    };

    let books_routes = make_books_routes(state.clone()).merge(make_search_routes(state.clone()));
    let shelves_routes = make_shelves_routes(state.clone());

    let api_routes: Router = Router::new()
        .nest("/books", books_routes)
        .nest("/shelves", shelves_routes)
        .fallback(api_not_found);

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let frontend_path = PathBuf::from(frontend_path);
            if !frontend_path.is_dir() {
                anyhow::bail!("Frontend directory does not exist: {:?}", frontend_path);
            }
            let index_file = ServeFile::new(frontend_path.join("index.html"));
            let static_files_service = ServeDir::new(&frontend_path)
                .append_index_html_on_directories(true)
                .fallback(index_file);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    book_store: Arc<dyn BookStore>,
    catalog_search: Arc<dyn CatalogSearch>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, book_store, catalog_search)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;
    Ok(())
}
