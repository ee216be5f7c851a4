//! HTTP surface for the catalog.
//!
//! - `GET    /`: welcome text
//! - `GET    /health`: server status
//! - `GET    /view_books`: every book (404 when the catalog is empty)
//! - `GET    /search_book/{title}`: title substring search
//! - `POST   /add_book`: create a book
//! - `PUT    /update_book/{book_id}`: partial update / type conversion
//! - `DELETE /delete_book/{book_id}`: delete one book
//! - `DELETE /delete_books`: bulk delete, body `{"book_ids": [...]}`
//!
//! Errors are returned as `{"error": "..."}` with the status from
//! [`CatalogError::status_code`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::model::Book;
use crate::validate::Record;

/// Error wrapper that renders as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    books: usize,
}

#[derive(Serialize)]
struct BookResponse {
    book: Book,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<&'static str>,
}

#[derive(Serialize)]
struct SearchResponse {
    books: Vec<Book>,
    success: &'static str,
}

#[derive(Serialize)]
struct BulkDeleteResponse {
    deleted: usize,
    success: String,
}

/// Build the router for `catalog`.
pub fn router(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/view_books", get(view_books))
        .route("/search_book/{title}", get(search_book))
        .route("/add_book", post(add_book))
        .route("/update_book/{book_id}", put(update_book))
        .route("/delete_book/{book_id}", delete(delete_book))
        .route("/delete_books", delete(delete_books))
        .layer(CorsLayer::permissive())
        .with_state(catalog)
}

/// Serve `catalog` at `addr` (e.g. `"0.0.0.0:5000"`) until the process exits.
pub async fn serve(catalog: Arc<Catalog>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "book catalog listening");
    axum::serve(listener, router(catalog)).await
}

async fn home() -> &'static str {
    "Welcome to the Library Systems"
}

async fn health(State(catalog): State<Arc<Catalog>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        books: catalog.store().load_all().len(),
    })
}

async fn view_books(State(catalog): State<Arc<Catalog>>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(catalog.list()?))
}

async fn search_book(
    State(catalog): State<Arc<Catalog>>,
    Path(title): Path<String>,
) -> ApiResult<Json<SearchResponse>> {
    let books = catalog.search(&title)?;
    Ok(Json(SearchResponse {
        books,
        success: "Books found successfully!",
    }))
}

async fn add_book(
    State(catalog): State<Arc<Catalog>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    let record = into_record(body)?;
    let book = catalog.create(&record)?;
    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            book,
            message: Some("Book added successfully!"),
            success: None,
        }),
    ))
}

async fn update_book(
    State(catalog): State<Arc<Catalog>>,
    Path(book_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<BookResponse>> {
    let patch = into_record(body)?;
    let book = catalog.update(&book_id, &patch)?;
    Ok(Json(BookResponse {
        book,
        message: Some("Book update successfully!"),
        success: None,
    }))
}

async fn delete_book(
    State(catalog): State<Arc<Catalog>>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<BookResponse>> {
    let book = catalog.delete(&book_id)?;
    Ok(Json(BookResponse {
        book,
        message: None,
        success: Some("Book deleted successfully!"),
    }))
}

async fn delete_books(
    State(catalog): State<Arc<Catalog>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let ids = body
        .get("book_ids")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let deleted = catalog.delete_many(&ids)?;
    Ok(Json(BulkDeleteResponse {
        deleted,
        success: format!("{deleted} book/s were successfully deleted."),
    }))
}

fn into_record(body: Value) -> Result<Record, CatalogError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(CatalogError::malformed("Request body must be a JSON object.")),
    }
}
