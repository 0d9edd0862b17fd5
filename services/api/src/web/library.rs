//! services/api/src/web/library.rs
//!
//! Axum handlers for library entry operations.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use wordshelf_core::domain::{AddBookRequest, ReadingStatus};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLibraryEntryRequest {
    pub catalog_key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub first_publish_year: Option<i32>,
    /// One of `reading`, `finished`, `want-to-read`.
    #[schema(value_type = String, example = "reading")]
    pub status: ReadingStatus,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReadingStatus,
}

#[derive(Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<ReadingStatus>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: Uuid,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Add a book from the catalog to the caller's library.
#[utoipa::path(
    post,
    path = "/library",
    request_body = AddLibraryEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = CreatedResponse),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Book already in the library")
    )
)]
pub async fn add_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<AddLibraryEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_id = state
        .library
        .add_library_entry(
            Some(user_id),
            AddBookRequest {
                catalog_key: req.catalog_key,
                title: req.title,
                author: req.author,
                cover_url: req.cover_url,
                isbn: req.isbn,
                first_publish_year: req.first_publish_year,
                status: req.status,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: entry_id })))
}

/// The caller's library, optionally filtered by `?status=`.
pub async fn list_library_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .library
        .list_my_library(Some(user_id), filter.status)
        .await?;
    Ok(Json(entries))
}

/// One entry with its book; `null` when missing or foreign.
pub async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let enriched = state
        .library
        .get_library_entry(Some(user_id), entry_id)
        .await?;
    Ok(Json(enriched))
}

pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .library
        .update_entry_status(Some(user_id), entry_id, req.status)
        .await?;
    Ok(Json(entry))
}

pub async fn update_notes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .library
        .update_entry_notes(Some(user_id), entry_id, req.notes)
        .await?;
    Ok(Json(entry))
}

/// Remove an entry; cascades to its words and their likes.
pub async fn remove_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .library
        .remove_library_entry(Some(user_id), entry_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Another user's library; empty unless their profile is public.
pub async fn user_library_handler(
    State(state): State<Arc<AppState>>,
    Path(target_user): Path<Uuid>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .library
        .list_user_library(target_user, filter.status)
        .await?;
    Ok(Json(entries))
}
