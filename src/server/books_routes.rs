//! Book collection API routes

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{method_not_allowed, parse_id, ApiError, JsonBody};
use super::state::{GuardedBookStore, ServerState};
use crate::book_store::{Book, BookDetailsPatch, NewBook};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct UpdateStatusBody {
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct UpdateTypeBody {
    #[serde(default, rename = "type")]
    pub book_type: String,
}

async fn list_books(State(store): State<GuardedBookStore>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(store.get_books()?))
}

async fn add_book(
    State(store): State<GuardedBookStore>,
    JsonBody(new_book): JsonBody<NewBook>,
) -> Result<impl IntoResponse, ApiError> {
    let book = store.add_book(new_book)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ApiError> {
    let id = parse_id(path, "book")?;
    Ok(Json(store.get_book_by_id(id)?))
}

async fn update_book_status(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
    JsonBody(body): JsonBody<UpdateStatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path, "book")?;
    store.update_book_status(id, &body.status)?;
    Ok(Json(json!({ "message": "Book status updated successfully" })))
}

async fn update_book_type(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
    JsonBody(body): JsonBody<UpdateTypeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path, "book")?;
    store.update_book_type(id, &body.book_type)?;
    Ok(Json(json!({ "message": "Book type updated successfully" })))
}

async fn update_book_details(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
    JsonBody(patch): JsonBody<BookDetailsPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path, "book")?;
    let book = store.update_book_details(id, patch)?;
    Ok(Json(json!({
        "message": "Book details updated successfully",
        "book": book,
    })))
}

async fn delete_book(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path, "book")?;
    store.delete_book(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn make_books_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route(
            "/{id}",
            get(get_book).put(update_book_status).delete(delete_book),
        )
        .route("/{id}/details", put(update_book_details))
        .route("/{id}/type", put(update_book_type))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}
