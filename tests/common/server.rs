//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and stub catalog.

use super::constants::*;
use super::fixtures::{create_test_db_location, spawn_stub_catalog};
use bookshelf_server::book_store::{BookStore, SqliteBookStore};
use bookshelf_server::catalog_search::{CatalogSearch, OpenLibraryClient, OpenLibraryConfig};
use bookshelf_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database and stub catalog
///
/// When dropped, both servers gracefully shut down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Book store for direct database access in tests
    pub book_store: Arc<dyn BookStore>,

    /// Path of the SQLite database backing this server
    pub db_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    _catalog_shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary SQLite database
    /// 2. Spawns a stub Open Library catalog on its own random port
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if any of the steps above fails or the server doesn't become
    /// ready within timeout.
    pub async fn spawn() -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_location().expect("Failed to create test database location");

        let book_store: Arc<dyn BookStore> =
            Arc::new(SqliteBookStore::new(&db_path).expect("Failed to open book store"));

        let (catalog_url, catalog_shutdown_tx) = spawn_stub_catalog()
            .await
            .expect("Failed to spawn stub catalog");
        let catalog_search: Arc<dyn CatalogSearch> = Arc::new(
            OpenLibraryClient::new(OpenLibraryConfig {
                search_base_url: catalog_url.clone(),
                covers_base_url: catalog_url,
                timeout: Duration::from_secs(CATALOG_TIMEOUT_SECS),
                ..Default::default()
            })
            .expect("Failed to build catalog client"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            max_body_bytes: TEST_MAX_BODY_BYTES,
            ..Default::default()
        };

        let app = make_app(config, book_store.clone(), catalog_search).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            book_store,
            db_path,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
            _catalog_shutdown_tx: Some(catalog_shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the status endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signals
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(tx) = self._catalog_shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
