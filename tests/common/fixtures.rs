//! Test fixture creation
//!
//! Provides the scratch database location and a stub of the Open Library
//! search API served from a local axum router.

use super::constants::*;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Creates a temp directory and returns the path of a not yet existing database file inside it
pub fn create_test_db_location() -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("bookshelf.db");
    Ok((dir, db_path))
}

#[derive(Deserialize)]
struct StubSearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

fn stub_docs() -> Vec<Value> {
    vec![
        json!({
            "key": format!("/works/{}", DUNE_EXTERNAL_ID),
            "title": "Dune",
            "author_name": ["Frank Herbert"],
            "isbn": ["0441013597", DUNE_ISBN],
            "cover_i": DUNE_COVER_ID,
        }),
        json!({
            "key": format!("/works/{}", DUNE_MESSIAH_EXTERNAL_ID),
            "title": "Dune Messiah",
            "author_name": ["Frank Herbert"],
            "isbn": ["0593098234"],
        }),
        // Missing key, never surfaced as a hit.
        json!({
            "title": "Dune: A Graphic Novel",
            "author_name": ["Brian Herbert", "Kevin J. Anderson"],
        }),
        json!({
            "key": format!("/works/{}", LEFT_HAND_EXTERNAL_ID),
            "title": "The Left Hand of Darkness",
            "author_name": ["Ursula K. Le Guin"],
            "cover_i": -1,
        }),
    ]
}

async fn stub_search(Query(params): Query<StubSearchParams>) -> Response {
    let query = params.q.unwrap_or_default().to_lowercase();
    match query.as_str() {
        FAILING_QUERY => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        MALFORMED_QUERY => return (StatusCode::OK, "<html>not json</html>").into_response(),
        WRONG_SHAPE_QUERY => return Json(json!({ "numFound": 0 })).into_response(),
        _ => {}
    }

    let docs: Vec<Value> = stub_docs()
        .into_iter()
        .filter(|doc| {
            let title = doc["title"].as_str().unwrap_or_default().to_lowercase();
            let authors = doc["author_name"].to_string().to_lowercase();
            title.contains(&query) || authors.contains(&query)
        })
        .take(params.limit.unwrap_or(100))
        .collect();
    Json(json!({ "numFound": docs.len(), "docs": docs })).into_response()
}

/// Spawns the stub catalog on a random port, returning its base URL and a shutdown handle
pub async fn spawn_stub_catalog() -> anyhow::Result<(String, tokio::sync::oneshot::Sender<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let app = Router::new().route("/search.json", get(stub_search));
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Stub catalog failed");
    });

    Ok((base_url, shutdown_tx))
}
