//! Personal book collection: entities, validation and persistence.

mod models;
mod schema;
mod store;
mod validation;

pub use models::{Book, BookDetailsPatch, BookStatus, BookType, NewBook, Patch, Shelf};
pub use schema::BOOKSHELF_VERSIONED_SCHEMAS;
pub use store::SqliteBookStore;
pub use validation::{ValidationError, ValidationResult};

use thiserror::Error;

/// Errors produced by [`BookStore`] operations.
#[derive(Debug, Error)]
pub enum BookStoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Storage error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type BookStoreResult<T> = Result<T, BookStoreError>;

/// Durable storage of the book collection.
///
/// Every mutation is atomic: it either runs as a single statement or inside a
/// transaction, so no partial change is visible when an operation fails.
pub trait BookStore: Send + Sync {
    /// Applies defaults, validates and inserts a book, returning it with its new id.
    fn add_book(&self, book: NewBook) -> BookStoreResult<Book>;

    /// All books ordered by title, ties broken by id.
    fn get_books(&self) -> BookStoreResult<Vec<Book>>;

    fn get_book_by_id(&self, id: i64) -> BookStoreResult<Book>;

    fn update_book_status(&self, id: i64, status: &str) -> BookStoreResult<()>;

    fn update_book_type(&self, id: i64, book_type: &str) -> BookStoreResult<()>;

    /// Changes only the fields present in the patch and returns the updated book.
    fn update_book_details(&self, id: i64, patch: BookDetailsPatch) -> BookStoreResult<Book>;

    /// Removes the book and its shelf memberships.
    fn delete_book(&self, id: i64) -> BookStoreResult<()>;

    // Shelves
    fn create_shelf(&self, name: &str) -> BookStoreResult<Shelf>;
    fn get_shelves(&self) -> BookStoreResult<Vec<Shelf>>;
    fn delete_shelf(&self, id: i64) -> BookStoreResult<()>;
    /// Adding a book that is already on the shelf is a no-op.
    fn add_book_to_shelf(&self, shelf_id: i64, book_id: i64) -> BookStoreResult<()>;
    fn remove_book_from_shelf(&self, shelf_id: i64, book_id: i64) -> BookStoreResult<()>;
    fn get_books_in_shelf(&self, shelf_id: i64) -> BookStoreResult<Vec<Book>>;
}
