//! Bookshelf Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod book_store;
pub mod catalog_search;
pub mod config;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use book_store::{BookStore, SqliteBookStore};
pub use catalog_search::{CatalogSearch, OpenLibraryClient};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
