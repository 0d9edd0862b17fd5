//! services/api/src/web/profile.rs
//!
//! Axum handlers for the caller's own profile and public profile lookups.

use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use wordshelf_core::domain::ProfilePatch;

/// The caller's full profile, including email and settings.
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.library.get_my_profile(Some(user_id)).await?;
    Ok(Json(user))
}

/// Patch the caller's bio, avatar, or settings.
pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(patch): Json<ProfilePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.library.update_my_profile(Some(user_id), patch).await?;
    Ok(Json(user))
}

/// Public profile by username; `null` for unknown or private users. Only
/// the restricted projection is returned.
pub async fn public_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.library.get_public_profile(&username).await?;
    Ok(Json(profile))
}
