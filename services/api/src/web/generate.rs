//! services/api/src/web/generate.rs
//!
//! The AI code-generation endpoint. Generation never fails outward: the
//! response degrades through three tiers (model JSON, repaired raw text,
//! offline template) and always carries a well-formed payload. The only
//! error responses here are 401 (no session) and 400 (missing prompt).

use std::sync::Arc;

use axum::{extract::State, Json};
use gallery_core::generation::{build_instruction, Generation};
use gallery_core::ports::PortError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub name: String,
    pub description: String,
    pub code: String,
}

/// Generate component code from a natural-language prompt.
#[utoipa::path(
    post,
    path = "/ai/generate-code",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated component (possibly a fallback)", body = GenerateResponse),
        (status = 400, description = "Missing prompt"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn generate_code_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(ApiError::Port(PortError::Validation(
            "Prompt is required".to_string(),
        )));
    }

    let instruction = build_instruction(&body.prompt, &body.technologies);
    // Single attempt; any failure drops through the tiers instead of retrying.
    let raw = state.codegen.generate(&instruction).await;

    let generation = Generation::resolve(raw, &body.prompt, &body.technologies);
    match &generation {
        Generation::Offline(_) => {
            warn!(tier = generation.tier(), "model call failed, serving offline template")
        }
        _ => info!(tier = generation.tier(), "code generation resolved"),
    }

    let component = generation.into_component();
    Ok(Json(GenerateResponse {
        name: component.name,
        description: component.description,
        code: component.code,
    }))
}
