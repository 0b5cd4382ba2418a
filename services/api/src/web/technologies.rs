//! services/api/src/web/technologies.rs
//!
//! Listing of the shared technology vocabulary, used by the create/edit
//! forms and the gallery filter bar.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct TechnologyResponse {
    pub id: Uuid,
    pub name: String,
}

/// All technologies, sorted by name.
#[utoipa::path(
    get,
    path = "/technologies",
    responses(
        (status = 200, description = "All technologies", body = [TechnologyResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_technologies_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TechnologyResponse>>, ApiError> {
    let technologies = state.store.list_technologies().await?;
    Ok(Json(
        technologies
            .into_iter()
            .map(|t| TechnologyResponse {
                id: t.id,
                name: t.name,
            })
            .collect(),
    ))
}
