//! JSON error responses and strict request body parsing.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequest, Path, Query, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{error::Category, json};
use tracing::{error, warn};

use super::state::ServerState;
use crate::book_store::BookStoreError;
use crate::catalog_search::SearchError;

/// Every variant renders as `{"error": "<message>"}` with the matching status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    Conflict(String),
    PayloadTooLarge(String),
    BadGateway(String),
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::BadGateway(msg) => msg,
            ApiError::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<BookStoreError> for ApiError {
    fn from(err: BookStoreError) -> Self {
        match err {
            BookStoreError::Validation(err) => ApiError::BadRequest(err.to_string()),
            BookStoreError::Conflict(msg) => ApiError::Conflict(msg),
            err @ BookStoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            BookStoreError::Internal(err) => {
                error!("Book store failure: {:#}", err);
                ApiError::Internal
            }
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => ApiError::BadRequest(err.to_string()),
            SearchError::Upstream(_) | SearchError::Decode(_) => {
                warn!("Catalog search failed: {}", err);
                ApiError::BadGateway(err.to_string())
            }
            SearchError::Store(err) => err.into(),
        }
    }
}

/// Resolves a numeric id path segment, rejecting anything that is not an integer.
pub fn parse_id(path: Result<Path<i64>, PathRejection>, entity: &str) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID format", entity)))
}

/// Unwraps a query string extraction, reporting failures as JSON errors.
pub fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Installed on every route so a known path with an unsupported method keeps the JSON error shape.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

/// Strips the " at line X column Y" suffix serde_json appends to its messages.
fn without_position(message: &str) -> &str {
    match message.rfind(" at line ") {
        Some(index) => &message[..index],
        None => message,
    }
}

fn describe_json_error(err: &serde_json::Error) -> String {
    match err.classify() {
        Category::Syntax => format!(
            "Request body contains badly-formed JSON (at line {} column {})",
            err.line(),
            err.column()
        ),
        Category::Eof => "Request body contains badly-formed JSON".to_string(),
        Category::Data => {
            let message = err.to_string();
            let message = without_position(&message);
            if let Some(rest) = message.strip_prefix("unknown field ") {
                let field = rest.split(',').next().unwrap_or(rest);
                format!("Request body contains unknown field {}", field)
            } else if let Some(rest) = message.strip_prefix("missing field ") {
                format!("Request body is missing field {}", rest)
            } else {
                format!("Request body contains an invalid value: {}", message)
            }
        }
        Category::Io => "Failed to read request body".to_string(),
    }
}

pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest(
            "Request body must not be empty".to_string(),
        ));
    }
    serde_json::from_slice(bytes).map_err(|err| ApiError::BadRequest(describe_json_error(&err)))
}

/// JSON body extractor with descriptive rejections for malformed, empty,
/// mistyped, unknown-field and oversized payloads.
pub struct JsonBody<T>(pub T);

impl<T: DeserializeOwned + Send> FromRequest<ServerState> for JsonBody<T> {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ServerState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge(format!(
                    "Request body must not be larger than {} bytes",
                    state.config.max_body_bytes
                ))
            } else {
                ApiError::BadRequest(rejection.body_text())
            }
        })?;
        parse_json_body(&bytes).map(JsonBody)
    }
}
