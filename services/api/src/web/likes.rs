//! services/api/src/web/likes.rs
//!
//! Like status and toggle handlers. A like is a bare (component, user) pair;
//! its existence is the whole "liked" state.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::session_user;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub like_count: i64,
    pub message: String,
}

/// Like status for the current viewer. Anonymous callers get `liked: false`.
#[utoipa::path(
    get,
    path = "/components/{id}/like",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "Like status", body = LikeStatusResponse),
        (status = 404, description = "No component with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn like_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<LikeStatusResponse>, ApiError> {
    state.store.get_component_meta(id).await?;

    let liked = match session_user(&state, &headers).await {
        Some(viewer) => state.store.like_exists(id, viewer).await?,
        None => false,
    };
    let like_count = state.store.count_likes(id).await?;

    Ok(Json(LikeStatusResponse { liked, like_count }))
}

/// Toggle the caller's like. Concurrent toggles for the same pair resolve
/// through the store's pair uniqueness, not application locking.
#[utoipa::path(
    post,
    path = "/components/{id}/like",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "New like state", body = LikeToggleResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No component with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn toggle_like_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeToggleResponse>, ApiError> {
    state.store.get_component_meta(id).await?;

    let (liked, message) = if state.store.like_exists(id, user_id).await? {
        state.store.delete_like(id, user_id).await?;
        (false, "Like removed")
    } else {
        state.store.insert_like(id, user_id).await?;
        (true, "Component liked")
    };
    let like_count = state.store.count_likes(id).await?;

    Ok(Json(LikeToggleResponse {
        liked,
        like_count,
        message: message.to_string(),
    }))
}
