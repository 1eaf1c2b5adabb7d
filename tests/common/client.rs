//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all bookshelf-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Adds a book and returns its assigned ID
    ///
    /// # Panics
    ///
    /// Panics if the book is not created (indicates test setup problem).
    pub async fn add_book_ok(&self, title: &str, author: &str, external_id: &str) -> i64 {
        let response = self
            .add_book(json!({
                "title": title,
                "author": author,
                "external_id": external_id,
            }))
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Failed to add book {}",
            title
        );
        let book: Value = response.json().await.unwrap();
        book["id"].as_i64().expect("Book has no id")
    }

    // ========================================================================
    // Status Endpoint
    // ========================================================================

    /// GET /
    pub async fn get_status(&self) -> Response {
        self.client.get(self.url("/")).send().await.unwrap()
    }

    // ========================================================================
    // Book Endpoints
    // ========================================================================

    /// GET /api/books
    pub async fn get_books(&self) -> Response {
        self.client.get(self.url("/api/books")).send().await.unwrap()
    }

    /// POST /api/books
    pub async fn add_book(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/books"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// POST /api/books with a raw body
    pub async fn add_book_raw(&self, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .post(self.url("/api/books"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// GET /api/books/{id}
    pub async fn get_book(&self, id: impl std::fmt::Display) -> Response {
        self.client
            .get(self.url(&format!("/api/books/{}", id)))
            .send()
            .await
            .unwrap()
    }

    /// PUT /api/books/{id}
    pub async fn update_book_status(&self, id: impl std::fmt::Display, status: &str) -> Response {
        self.client
            .put(self.url(&format!("/api/books/{}", id)))
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap()
    }

    /// PUT /api/books/{id}/type
    pub async fn update_book_type(&self, id: impl std::fmt::Display, book_type: &str) -> Response {
        self.client
            .put(self.url(&format!("/api/books/{}/type", id)))
            .json(&json!({ "type": book_type }))
            .send()
            .await
            .unwrap()
    }

    /// PUT /api/books/{id}/details
    pub async fn update_book_details(&self, id: impl std::fmt::Display, body: Value) -> Response {
        self.client
            .put(self.url(&format!("/api/books/{}/details", id)))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// DELETE /api/books/{id}
    pub async fn delete_book(&self, id: impl std::fmt::Display) -> Response {
        self.client
            .delete(self.url(&format!("/api/books/{}", id)))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Search Endpoint
    // ========================================================================

    /// GET /api/books/search?q={query}
    pub async fn search(&self, query: &str) -> Response {
        self.client
            .get(self.url("/api/books/search"))
            .query(&[("q", query)])
            .send()
            .await
            .unwrap()
    }

    /// GET /api/books/search without the `q` parameter
    pub async fn search_without_query(&self) -> Response {
        self.client
            .get(self.url("/api/books/search"))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Shelf Endpoints
    // ========================================================================

    /// GET /api/shelves
    pub async fn get_shelves(&self) -> Response {
        self.client.get(self.url("/api/shelves")).send().await.unwrap()
    }

    /// POST /api/shelves
    pub async fn create_shelf(&self, name: &str) -> Response {
        self.client
            .post(self.url("/api/shelves"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /api/shelves/{id}
    pub async fn delete_shelf(&self, id: impl std::fmt::Display) -> Response {
        self.client
            .delete(self.url(&format!("/api/shelves/{}", id)))
            .send()
            .await
            .unwrap()
    }

    /// GET /api/shelves/{id}/books
    pub async fn get_shelf_books(&self, id: impl std::fmt::Display) -> Response {
        self.client
            .get(self.url(&format!("/api/shelves/{}/books", id)))
            .send()
            .await
            .unwrap()
    }

    /// PUT /api/shelves/{shelf_id}/books/{book_id}
    pub async fn add_book_to_shelf(&self, shelf_id: i64, book_id: i64) -> Response {
        self.client
            .put(self.url(&format!("/api/shelves/{}/books/{}", shelf_id, book_id)))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /api/shelves/{shelf_id}/books/{book_id}
    pub async fn remove_book_from_shelf(&self, shelf_id: i64, book_id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/api/shelves/{}/books/{}", shelf_id, book_id)))
            .send()
            .await
            .unwrap()
    }
}
