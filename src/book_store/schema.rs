//! SQLite schema definitions for the bookshelf database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnDelete, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Version 1 - Books
// =============================================================================

const BOOKS_TABLE_V1: Table = Table {
    name: "books",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!(
            "title",
            &SqlType::Text,
            non_null = true,
            check = Some("length(trim(title)) > 0")
        ),
        sqlite_column!(
            "author",
            &SqlType::Text,
            non_null = true,
            check = Some("length(trim(author)) > 0")
        ),
        sqlite_column!(
            "external_id",
            &SqlType::Text,
            non_null = true,
            check = Some("length(trim(external_id)) > 0")
        ),
        sqlite_column!("isbn", &SqlType::Text),
        sqlite_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'Want to Read'"),
            check = Some("status IN ('Want to Read', 'Currently Reading', 'Read')")
        ),
        sqlite_column!(
            "book_type",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'book'"),
            check = Some("book_type IN ('book', 'audiobook')")
        ),
        sqlite_column!(
            "rating",
            &SqlType::Integer,
            check = Some("rating IS NULL OR (rating >= 1 AND rating <= 10)")
        ),
        sqlite_column!("comments", &SqlType::Text),
        sqlite_column!("cover_url", &SqlType::Text),
        sqlite_column!("series", &SqlType::Text),
        sqlite_column!(
            "series_index",
            &SqlType::Integer,
            check = Some("series_index IS NULL OR (series_index > 0 AND series IS NOT NULL)")
        ),
    ],
    indices: &[("idx_books_title", "title")],
    unique_constraints: &[&["external_id"]],
};

// =============================================================================
// Version 2 - Custom shelves
// =============================================================================

const SHELVES_TABLE_V2: Table = Table {
    name: "shelves",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!(
            "name",
            &SqlType::Text,
            non_null = true,
            check = Some("length(trim(name)) > 0")
        ),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["name"]],
};

const BOOK_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "books",
    foreign_column: "id",
    on_delete: ForeignKeyOnDelete::Cascade,
};

const SHELF_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "shelves",
    foreign_column: "id",
    on_delete: ForeignKeyOnDelete::Cascade,
};

const BOOK_SHELVES_TABLE_V2: Table = Table {
    name: "book_shelves",
    columns: &[
        sqlite_column!(
            "book_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_FOREIGN_KEY)
        ),
        sqlite_column!(
            "shelf_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SHELF_FOREIGN_KEY)
        ),
        sqlite_column!("added_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_book_shelves_shelf_id", "shelf_id")],
    unique_constraints: &[&["book_id", "shelf_id"]],
};

/// Migration from version 1 to version 2: add shelves and memberships.
fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    SHELVES_TABLE_V2.create(conn)?;
    BOOK_SHELVES_TABLE_V2.create(conn)?;
    Ok(())
}

pub const BOOKSHELF_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[BOOKS_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[BOOKS_TABLE_V1, SHELVES_TABLE_V2, BOOK_SHELVES_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
];
