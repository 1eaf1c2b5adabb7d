use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

/// Reading progress of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookStatus {
    #[default]
    #[serde(rename = "Want to Read")]
    WantToRead,
    #[serde(rename = "Currently Reading")]
    CurrentlyReading,
    #[serde(rename = "Read")]
    Read,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [
        BookStatus::WantToRead,
        BookStatus::CurrentlyReading,
        BookStatus::Read,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::WantToRead => "Want to Read",
            BookStatus::CurrentlyReading => "Currently Reading",
            BookStatus::Read => "Read",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Want to Read" => Some(BookStatus::WantToRead),
            "Currently Reading" => Some(BookStatus::CurrentlyReading),
            "Read" => Some(BookStatus::Read),
            _ => None,
        }
    }
}

/// Physical format of a tracked title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookType {
    #[default]
    Book,
    Audiobook,
}

impl BookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookType::Book => "book",
            BookType::Audiobook => "audiobook",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "book" => Some(BookType::Book),
            "audiobook" => Some(BookType::Audiobook),
            _ => None,
        }
    }
}

// =============================================================================
// Stored entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub external_id: String,
    pub isbn: Option<String>,
    pub status: BookStatus,
    #[serde(rename = "type")]
    pub book_type: BookType,
    pub rating: Option<i64>,
    pub comments: Option<String>,
    pub cover_url: Option<String>,
    pub series: Option<String>,
    pub series_index: Option<i64>,
}

/// A named, user-defined collection of books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shelf {
    pub id: i64,
    pub name: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

// =============================================================================
// Inbound payloads
// =============================================================================

/// Payload for adding a book. Enum-valued fields are kept as raw strings so that
/// normalisation and validation can report precise errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, alias = "open_library_id")]
    pub external_id: String,
    pub isbn: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub book_type: Option<String>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
    pub cover_url: Option<String>,
    pub series: Option<String>,
    pub series_index: Option<i64>,
}

/// Tri-state field of a partial update: absent, explicit `null`, or a value.
///
/// Fields of this type must carry `#[serde(default)]` so that a missing key
/// deserializes to `Unchanged` while `null` becomes `Clear`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Applies the patch on top of the current value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Unchanged => current,
            Patch::Clear => None,
            Patch::Set(value) => Some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookDetailsPatch {
    #[serde(default)]
    pub rating: Patch<i64>,
    #[serde(default)]
    pub comments: Patch<String>,
    #[serde(default)]
    pub series: Patch<String>,
    #[serde(default)]
    pub series_index: Patch<i64>,
}
