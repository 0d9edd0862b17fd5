//! services/api/src/web/words.rs
//!
//! Axum handlers for vocabulary word and like operations.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::library::CreatedResponse;
use crate::web::state::AppState;
use wordshelf_core::domain::{AddWordRequest, WordPatch};

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddWordBody {
    pub entry_id: Uuid,
    pub word: String,
    pub definition: Option<String>,
    pub context: Option<String>,
    pub page_number: Option<u32>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Attach a word to one of the caller's library entries.
#[utoipa::path(
    post,
    path = "/words",
    request_body = AddWordBody,
    responses(
        (status = 201, description = "Word created", body = CreatedResponse),
        (status = 400, description = "Word text empty after trimming"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn add_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<AddWordBody>,
) -> Result<impl IntoResponse, ApiError> {
    let word_id = state
        .library
        .add_word(
            Some(user_id),
            AddWordRequest {
                entry_id: req.entry_id,
                word: req.word,
                definition: req.definition,
                context: req.context,
                page_number: req.page_number,
                notes: req.notes,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: word_id })))
}

/// Patch the optional fields of a word; absent fields stay untouched.
pub async fn update_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(word_id): Path<Uuid>,
    Json(patch): Json<WordPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let word = state
        .library
        .update_word(Some(user_id), word_id, patch)
        .await?;
    Ok(Json(word))
}

pub async fn remove_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(word_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.library.remove_word(Some(user_id), word_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Words for one of the caller's entries, newest first.
pub async fn entry_words_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let words = state
        .library
        .list_words_for_entry(Some(user_id), entry_id)
        .await?;
    Ok(Json(words))
}

/// All of the caller's words across books, with book title and author.
pub async fn my_words_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let words = state.library.list_my_words(Some(user_id)).await?;
    Ok(Json(words))
}

/// Toggle the caller's like on a word.
#[utoipa::path(
    post,
    path = "/words/{id}/like",
    params(("id" = Uuid, Path, description = "Word id")),
    responses(
        (status = 200, description = "New like state"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Word not found")
    )
)]
pub async fn toggle_like_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(word_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let toggle = state.library.toggle_like(Some(user_id), word_id).await?;
    Ok(Json(toggle))
}
