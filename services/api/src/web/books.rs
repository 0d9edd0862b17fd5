//! services/api/src/web/books.rs
//!
//! Public, unauthenticated book endpoints: catalog search plus the read
//! side of the canonical book records.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct KeyQuery {
    pub key: String,
}

/// Search the external catalog. Best-effort: a provider failure degrades
/// to an empty result set rather than an error response.
#[utoipa::path(
    get,
    path = "/books/search",
    params(("q" = String, Query, description = "Free-text query")),
    responses(
        (status = 200, description = "Candidate books, possibly empty")
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let candidates = match state.search.search(&query.q).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("catalog search failed, returning empty result: {e}");
            Vec::new()
        }
    };
    Ok(Json(candidates))
}

/// Recently added books, newest first.
pub async fn recent_books_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let books = state.library.list_recent_books().await?;
    Ok(Json(books))
}

/// Look up the canonical book for a catalog key, if one has been
/// materialized. The key is passed as a query parameter because Open
/// Library keys contain slashes.
pub async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.library.get_book_by_catalog_key(&query.key).await?;
    Ok(Json(book))
}

/// Public words attached to a book, from all users.
pub async fn book_words_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let words = state.library.list_public_words_for_book(book_id).await?;
    Ok(Json(words))
}

/// Public profiles of everyone with this book in their library.
pub async fn book_readers_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let readers = state.library.list_book_readers(book_id).await?;
    Ok(Json(readers))
}
