//! Normalisation and validation of book payloads.
//!
//! Every write path goes through here before touching the database; the
//! schema's CHECK constraints only back these rules up.

use super::models::{Book, BookDetailsPatch, BookStatus, BookType, NewBook, Patch};
use thiserror::Error;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    EmptyField { field: &'static str },

    #[error("rating must be between 1 and 10, got {0}")]
    RatingOutOfRange(i64),

    #[error("Invalid status value '{0}'. Must be 'Want to Read', 'Currently Reading', or 'Read'")]
    InvalidStatus(String),

    #[error("Invalid type value '{0}'. Must be 'book' or 'audiobook'")]
    InvalidType(String),

    #[error("Series index must be greater than 0, got {0}")]
    NonPositiveSeriesIndex(i64),

    #[error("Cannot provide series_index without series name")]
    SeriesIndexWithoutSeries,

    /// A storage-level CHECK constraint rejected the row.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub fn validate_rating(rating: Option<i64>) -> ValidationResult<()> {
    match rating {
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => {
            Err(ValidationError::RatingOutOfRange(r))
        }
        _ => Ok(()),
    }
}

/// Empty strings are rejected; callers wanting a default must apply it first.
pub fn validate_status(status: &str) -> ValidationResult<BookStatus> {
    BookStatus::parse(status).ok_or_else(|| ValidationError::InvalidStatus(status.to_string()))
}

/// A missing or empty type normalises to [`BookType::Book`].
pub fn validate_book_type(book_type: Option<&str>) -> ValidationResult<BookType> {
    match book_type.map(str::trim) {
        None | Some("") => Ok(BookType::default()),
        Some(value) => {
            BookType::parse(value).ok_or_else(|| ValidationError::InvalidType(value.to_string()))
        }
    }
}

pub fn validate_series(series: Option<&str>, series_index: Option<i64>) -> ValidationResult<()> {
    let Some(index) = series_index else {
        return Ok(());
    };
    if index <= 0 {
        return Err(ValidationError::NonPositiveSeriesIndex(index));
    }
    if series.map(str::trim).unwrap_or_default().is_empty() {
        return Err(ValidationError::SeriesIndexWithoutSeries);
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Applies defaults to an inbound payload and validates the result.
///
/// The returned book carries id `0` until the store assigns one.
pub fn normalize_new_book(new_book: NewBook) -> ValidationResult<Book> {
    validate_required("title", &new_book.title)?;
    validate_required("author", &new_book.author)?;
    validate_required("external_id", &new_book.external_id)?;

    let status = match new_book.status.as_deref() {
        None | Some("") => BookStatus::default(),
        Some(value) => validate_status(value)?,
    };
    let book_type = validate_book_type(new_book.book_type.as_deref())?;

    validate_rating(new_book.rating)?;
    let series = non_blank(new_book.series);
    validate_series(series.as_deref(), new_book.series_index)?;

    Ok(Book {
        id: 0,
        title: new_book.title.trim().to_string(),
        author: new_book.author.trim().to_string(),
        external_id: new_book.external_id.trim().to_string(),
        isbn: non_blank(new_book.isbn),
        status,
        book_type,
        rating: new_book.rating,
        comments: new_book.comments,
        cover_url: non_blank(new_book.cover_url),
        series,
        series_index: new_book.series_index,
    })
}

/// Checks the parts of a details patch that do not depend on the stored row,
/// and normalises a blank series name into an explicit clear.
pub fn normalize_details_patch(mut patch: BookDetailsPatch) -> ValidationResult<BookDetailsPatch> {
    if let Patch::Set(rating) = patch.rating {
        validate_rating(Some(rating))?;
    }
    if let Patch::Set(index) = patch.series_index {
        if index <= 0 {
            return Err(ValidationError::NonPositiveSeriesIndex(index));
        }
    }
    patch.series = match patch.series {
        Patch::Set(series) if series.trim().is_empty() => Patch::Clear,
        Patch::Set(series) => Patch::Set(series.trim().to_string()),
        other => other,
    };
    if matches!(patch.series, Patch::Clear) && matches!(patch.series_index, Patch::Set(_)) {
        return Err(ValidationError::SeriesIndexWithoutSeries);
    }
    Ok(patch)
}
