use super::models::{Book, BookDetailsPatch, BookStatus, BookType, NewBook, Shelf};
use super::schema::BOOKSHELF_VERSIONED_SCHEMAS;
use super::validation::{
    normalize_details_patch, normalize_new_book, validate_book_type, validate_required,
    validate_series, validate_status, ValidationError,
};
use super::{BookStore, BookStoreError, BookStoreResult};
use crate::sqlite_persistence::{migrate_if_needed, VersionedSchema};
use anyhow::{anyhow, Context};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const BOOK_COLUMNS: &str = "id, title, author, external_id, isbn, status, book_type, rating, \
                            comments, cover_url, series, series_index";

impl FromSql for BookStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        BookStatus::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown book status '{}'", raw).into()))
    }
}

impl ToSql for BookStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BookType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        BookType::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown book type '{}'", raw).into()))
    }
}

impl ToSql for BookType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl From<rusqlite::Error> for BookStoreError {
    fn from(err: rusqlite::Error) -> Self {
        BookStoreError::Internal(err.into())
    }
}

/// Maps constraint failures raised by SQLite onto domain errors.
fn map_write_error(err: rusqlite::Error, conflict_message: impl FnOnce() -> String) -> BookStoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return BookStoreError::Conflict(conflict_message());
                }
                ffi::SQLITE_CONSTRAINT_CHECK => {
                    let detail = message
                        .clone()
                        .unwrap_or_else(|| "CHECK constraint failed".to_string());
                    return ValidationError::Constraint(detail).into();
                }
                _ => {}
            }
        }
    }
    err.into()
}

fn not_found(entity: &'static str, id: i64) -> BookStoreError {
    BookStoreError::NotFound { entity, id }
}

pub struct SqliteBookStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists()
            || std::fs::metadata(path)
                .map(|m| m.len() == 0)
                .unwrap_or(false);

        let mut conn = Connection::open(path).context("Failed to open bookshelf database")?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        if is_new_db {
            info!("Creating new bookshelf database at {:?}", path);
            Self::latest_schema()?.create(&conn)?;
        } else {
            migrate_if_needed(&mut conn, BOOKSHELF_VERSIONED_SCHEMAS)
                .with_context(|| format!("Failed to open bookshelf database at {:?}", path))?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Fresh store backed by a private in-memory database.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::latest_schema()?.create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn latest_schema() -> anyhow::Result<&'static VersionedSchema> {
        BOOKSHELF_VERSIONED_SCHEMAS
            .last()
            .ok_or_else(|| anyhow!("No bookshelf schema defined"))
    }

    fn conn(&self) -> BookStoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Bookshelf database lock poisoned").into())
    }

    fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            external_id: row.get("external_id")?,
            isbn: row.get("isbn")?,
            status: row.get("status")?,
            book_type: row.get("book_type")?,
            rating: row.get("rating")?,
            comments: row.get("comments")?,
            cover_url: row.get("cover_url")?,
            series: row.get("series")?,
            series_index: row.get("series_index")?,
        })
    }

    fn row_to_shelf(row: &Row) -> rusqlite::Result<Shelf> {
        Ok(Shelf {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    fn find_book(conn: &Connection, id: i64) -> BookStoreResult<Option<Book>> {
        let book = conn
            .query_row(
                &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
                params![id],
                Self::row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn require_book(conn: &Connection, id: i64) -> BookStoreResult<()> {
        let exists = conn
            .query_row("SELECT 1 FROM books WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        exists.ok_or_else(|| not_found("Book", id))
    }

    fn require_shelf(conn: &Connection, id: i64) -> BookStoreResult<()> {
        let exists = conn
            .query_row("SELECT 1 FROM shelves WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        exists.ok_or_else(|| not_found("Shelf", id))
    }
}

impl BookStore for SqliteBookStore {
    #[instrument(skip(self, book), fields(external_id = %book.external_id))]
    fn add_book(&self, book: NewBook) -> BookStoreResult<Book> {
        let mut book = normalize_new_book(book).inspect_err(|err| {
            debug!("Rejected new book: {}", err);
        })?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO books (title, author, external_id, isbn, status, book_type, rating, \
             comments, cover_url, series, series_index) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                book.title,
                book.author,
                book.external_id,
                book.isbn,
                book.status,
                book.book_type,
                book.rating,
                book.comments,
                book.cover_url,
                book.series,
                book.series_index,
            ],
        )
        .map_err(|err| {
            map_write_error(err, || {
                format!(
                    "Book with external ID '{}' is already in the collection",
                    book.external_id
                )
            })
        })
        .inspect_err(|err| warn!("Failed to add book: {}", err))?;

        book.id = conn.last_insert_rowid();
        info!("Added book {} ({})", book.id, book.title);
        Ok(book)
    }

    #[instrument(skip(self))]
    fn get_books(&self) -> BookStoreResult<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books ORDER BY title ASC, id ASC",
            BOOK_COLUMNS
        ))?;
        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Retrieved {} books", books.len());
        Ok(books)
    }

    #[instrument(skip(self))]
    fn get_book_by_id(&self, id: i64) -> BookStoreResult<Book> {
        let conn = self.conn()?;
        Self::find_book(&conn, id)?.ok_or_else(|| not_found("Book", id))
    }

    #[instrument(skip(self))]
    fn update_book_status(&self, id: i64, status: &str) -> BookStoreResult<()> {
        let status = validate_status(status)?;
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE books SET status = ?1 WHERE id = ?2",
                params![status, id],
            )
            .map_err(|err| map_write_error(err, String::new))?;
        if updated == 0 {
            debug!("No book to update status for");
            return Err(not_found("Book", id));
        }
        info!("Book {} status set to '{}'", id, status.as_str());
        Ok(())
    }

    #[instrument(skip(self))]
    fn update_book_type(&self, id: i64, book_type: &str) -> BookStoreResult<()> {
        if book_type.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "type" }.into());
        }
        let book_type = validate_book_type(Some(book_type))?;
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE books SET book_type = ?1 WHERE id = ?2",
                params![book_type, id],
            )
            .map_err(|err| map_write_error(err, String::new))?;
        if updated == 0 {
            return Err(not_found("Book", id));
        }
        info!("Book {} type set to '{}'", id, book_type.as_str());
        Ok(())
    }

    #[instrument(skip(self, patch))]
    fn update_book_details(&self, id: i64, patch: BookDetailsPatch) -> BookStoreResult<Book> {
        let patch = normalize_details_patch(patch)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut book = Self::find_book(&tx, id)?.ok_or_else(|| not_found("Book", id))?;

        let clears_series_only = !patch.series.is_unchanged() && patch.series_index.is_unchanged();
        book.rating = patch.rating.apply(book.rating);
        book.comments = patch.comments.apply(book.comments);
        book.series = patch.series.apply(book.series);
        book.series_index = patch.series_index.apply(book.series_index);
        if clears_series_only && book.series.is_none() {
            book.series_index = None;
        }
        validate_series(book.series.as_deref(), book.series_index)?;

        tx.execute(
            "UPDATE books SET rating = ?1, comments = ?2, series = ?3, series_index = ?4 \
             WHERE id = ?5",
            params![
                book.rating,
                book.comments,
                book.series,
                book.series_index,
                id
            ],
        )
        .map_err(|err| map_write_error(err, String::new))?;
        tx.commit()?;

        info!("Updated details of book {}", id);
        Ok(book)
    }

    #[instrument(skip(self))]
    fn delete_book(&self, id: i64) -> BookStoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let memberships = tx.execute("DELETE FROM book_shelves WHERE book_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        if deleted == 0 {
            debug!("No book to delete");
            return Err(not_found("Book", id));
        }
        tx.commit()?;
        info!(
            "Deleted book {} (removed from {} shelves)",
            id, memberships
        );
        Ok(())
    }

    #[instrument(skip(self))]
    fn create_shelf(&self, name: &str) -> BookStoreResult<Shelf> {
        validate_required("name", name)?;
        let name = name.trim();
        let created_at = chrono::Utc::now().to_rfc3339();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO shelves (name, created_at) VALUES (?1, ?2)",
            params![name, created_at],
        )
        .map_err(|err| map_write_error(err, || format!("Shelf '{}' already exists", name)))?;

        let shelf = Shelf {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at,
        };
        info!("Created shelf {} ({})", shelf.id, shelf.name);
        Ok(shelf)
    }

    #[instrument(skip(self))]
    fn get_shelves(&self) -> BookStoreResult<Vec<Shelf>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM shelves ORDER BY name ASC, id ASC")?;
        let shelves = stmt
            .query_map([], Self::row_to_shelf)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shelves)
    }

    #[instrument(skip(self))]
    fn delete_shelf(&self, id: i64) -> BookStoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM book_shelves WHERE shelf_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM shelves WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(not_found("Shelf", id));
        }
        tx.commit()?;
        info!("Deleted shelf {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    fn add_book_to_shelf(&self, shelf_id: i64, book_id: i64) -> BookStoreResult<()> {
        let conn = self.conn()?;
        Self::require_shelf(&conn, shelf_id)?;
        Self::require_book(&conn, book_id)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO book_shelves (book_id, shelf_id, added_at) VALUES (?1, ?2, ?3)",
            params![book_id, shelf_id, chrono::Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 {
            debug!("Book already on shelf");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove_book_from_shelf(&self, shelf_id: i64, book_id: i64) -> BookStoreResult<()> {
        let conn = self.conn()?;
        Self::require_shelf(&conn, shelf_id)?;
        Self::require_book(&conn, book_id)?;
        conn.execute(
            "DELETE FROM book_shelves WHERE book_id = ?1 AND shelf_id = ?2",
            params![book_id, shelf_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn get_books_in_shelf(&self, shelf_id: i64) -> BookStoreResult<Vec<Book>> {
        let conn = self.conn()?;
        Self::require_shelf(&conn, shelf_id)?;
        let columns = BOOK_COLUMNS
            .split(", ")
            .map(|c| format!("b.{}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books b JOIN book_shelves bs ON b.id = bs.book_id \
             WHERE bs.shelf_id = ?1 ORDER BY b.title ASC, b.id ASC",
            columns
        ))?;
        let books = stmt
            .query_map(params![shelf_id], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }
}
