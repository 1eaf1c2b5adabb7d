//! Custom shelf API routes

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use super::error::{method_not_allowed, parse_id, ApiError, JsonBody};
use super::state::{GuardedBookStore, ServerState};
use crate::book_store::{Book, Shelf};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct CreateShelfBody {
    #[serde(default)]
    pub name: String,
}

fn parse_membership_path(
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<(i64, i64), ApiError> {
    path.map(|Path(ids)| ids)
        .map_err(|_| ApiError::BadRequest("Invalid shelf or book ID format".to_string()))
}

async fn list_shelves(State(store): State<GuardedBookStore>) -> Result<Json<Vec<Shelf>>, ApiError> {
    Ok(Json(store.get_shelves()?))
}

async fn create_shelf(
    State(store): State<GuardedBookStore>,
    JsonBody(body): JsonBody<CreateShelfBody>,
) -> Result<impl IntoResponse, ApiError> {
    let shelf = store.create_shelf(&body.name)?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

async fn delete_shelf(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path, "shelf")?;
    store.delete_shelf(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_shelf_books(
    State(store): State<GuardedBookStore>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let id = parse_id(path, "shelf")?;
    Ok(Json(store.get_books_in_shelf(id)?))
}

async fn add_book_to_shelf(
    State(store): State<GuardedBookStore>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let (shelf_id, book_id) = parse_membership_path(path)?;
    store.add_book_to_shelf(shelf_id, book_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_book_from_shelf(
    State(store): State<GuardedBookStore>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let (shelf_id, book_id) = parse_membership_path(path)?;
    store.remove_book_from_shelf(shelf_id, book_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn make_shelves_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_shelves).post(create_shelf))
        .route("/{id}", axum::routing::delete(delete_shelf))
        .route("/{id}/books", get(get_shelf_books))
        .route(
            "/{id}/books/{book_id}",
            put(add_book_to_shelf)
                .post(add_book_to_shelf)
                .delete(remove_book_from_shelf),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}
