//! services/api/src/web/components.rs
//!
//! Axum handlers for the component CRUD surface: paginated listing, detail
//! fetch (with its view-count side effect), create, partial update, delete.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gallery_core::domain::{
    ComponentChanges, ComponentDetail, ComponentFilter, ComponentStatus, NewComponent, SortKey,
};
use gallery_core::ports::{ComponentStore, PortError};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Candidate batch size for random mode. The shuffle runs over at most this
/// many rows, so the cap must stay well above typical page sizes or the
/// sample skews toward the first fetched batch.
const RANDOM_CANDIDATE_CAP: i64 = 50;

const DEFAULT_PAGE_SIZE: i64 = 10;

//=========================================================================================
// Request / Response Types
//=========================================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Status filter; "ALL" disables it. Defaults to PUBLISHED.
    pub status: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring over name or description.
    pub search: Option<String>,
    pub technology: Option<String>,
    pub tag: Option<String>,
    /// newest | oldest | popular | name.
    pub sort: Option<String>,
    /// Restrict to one owner's components (dashboard view).
    pub user_id: Option<Uuid>,
    /// Shuffle instead of sorting; returns `limit` items from an oversized
    /// candidate batch.
    pub random: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NamedEntity {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub preview_url: Option<String>,
    pub status: String,
    pub view_count: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub user: UserSummary,
    pub technologies: Vec<NamedEntity>,
    pub tags: Vec<NamedEntity>,
    pub like_count: i64,
}

impl From<ComponentDetail> for ComponentResponse {
    fn from(detail: ComponentDetail) -> Self {
        let component = detail.component;
        Self {
            id: component.id,
            name: component.name,
            description: component.description,
            code: component.code,
            preview_url: component.preview_url,
            status: component.status.as_str().to_string(),
            view_count: component.view_count,
            user_id: component.user_id,
            created_at: component.created_at,
            updated_at: component.updated_at,
            published_at: component.published_at,
            user: UserSummary {
                id: detail.user.id,
                name: detail.user.name,
                username: detail.user.username,
                image: detail.user.image,
            },
            technologies: detail
                .technologies
                .into_iter()
                .map(|t| NamedEntity { id: t.id, name: t.name })
                .collect(),
            tags: detail
                .tags
                .into_iter()
                .map(|t| NamedEntity { id: t.id, name: t.name })
                .collect(),
            like_count: detail.like_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentListResponse {
    pub components: Vec<ComponentResponse>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Detail responses wrap the component, matching the browse/edit pages.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentEnvelope {
    pub component: ComponentResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentRequest {
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub preview_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

fn parse_status(raw: &str) -> Result<ComponentStatus, ApiError> {
    raw.parse::<ComponentStatus>()
        .map_err(|e| ApiError::Port(PortError::Validation(e)))
}

/// Zero-indexed page arithmetic: page 1 starts at offset 0.
fn page_window(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// Resolves technology names to ids, creating missing ones.
async fn resolve_technology_ids(
    store: &dyn ComponentStore,
    names: &[String],
) -> Result<Vec<Uuid>, ApiError> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(store.find_or_create_technology(name).await?.id);
    }
    Ok(ids)
}

async fn resolve_tag_ids(
    store: &dyn ComponentStore,
    names: &[String],
) -> Result<Vec<Uuid>, ApiError> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(store.find_or_create_tag(name).await?.id);
    }
    Ok(ids)
}

/// Fetches the component's meta row and rejects non-owners. A missing id is
/// 404. An existing component owned by someone else is 403. The auth gate
/// has already run before this check.
async fn check_ownership(
    store: &dyn ComponentStore,
    id: Uuid,
    requester: Uuid,
    action: &str,
) -> Result<gallery_core::domain::ComponentMeta, ApiError> {
    let meta = store.get_component_meta(id).await?;
    if meta.user_id != requester {
        return Err(ApiError::Port(PortError::Forbidden(format!(
            "You do not have permission to {} this component",
            action
        ))));
    }
    Ok(meta)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List components with filtering, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/components",
    params(ListParams),
    responses(
        (status = 200, description = "One page of components", body = ComponentListResponse),
        (status = 400, description = "Invalid filter value"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_components_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ComponentListResponse>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let random = params.random.unwrap_or(false);

    let status = match params.status.as_deref() {
        None => Some(ComponentStatus::Published),
        Some("ALL") => None,
        Some(raw) => Some(parse_status(raw)?),
    };

    let filter = ComponentFilter {
        status,
        search: params.search.filter(|s| !s.is_empty()),
        technology: params.technology,
        tag: params.tag,
        user_id: params.user_id,
        sort: params.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        // Random mode oversamples from the start of the table and shuffles
        // in memory; approximate, but avoids a full-table shuffle.
        limit: if random { RANDOM_CANDIDATE_CAP } else { limit },
        offset: if random { 0 } else { page_window(page, limit) },
    };

    let mut details = state.store.list_components(&filter).await?;
    let total = state.store.count_components(&filter).await?;

    if random {
        details.shuffle(&mut rand::thread_rng());
        details.truncate(limit as usize);
    }

    Ok(Json(ComponentListResponse {
        components: details.into_iter().map(ComponentResponse::from).collect(),
        total_pages: total_pages(total, limit),
        current_page: page,
    }))
}

/// Fetch one component. Increments its view count as a side effect, for any
/// caller.
#[utoipa::path(
    get,
    path = "/components/{id}",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "The component", body = ComponentEnvelope),
        (status = 404, description = "No component with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_component_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComponentEnvelope>, ApiError> {
    let detail = state.store.get_component(id).await?;
    state.store.increment_view_count(id).await?;

    Ok(Json(ComponentEnvelope {
        component: detail.into(),
    }))
}

/// Create a component. Requires a session; name and code are mandatory.
#[utoipa::path(
    post,
    path = "/components",
    request_body = CreateComponentRequest,
    responses(
        (status = 201, description = "Component created", body = ComponentResponse),
        (status = 400, description = "Missing name or code"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_component_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(body): Json<CreateComponentRequest>,
) -> Result<(StatusCode, Json<ComponentResponse>), ApiError> {
    if body.name.trim().is_empty() || body.code.trim().is_empty() {
        return Err(ApiError::Port(PortError::Validation(
            "Component name and code are required".to_string(),
        )));
    }

    let status = match body.status.as_deref() {
        None => ComponentStatus::Draft,
        Some(raw) => parse_status(raw)?,
    };
    let published_at = (status == ComponentStatus::Published).then(Utc::now);

    let technology_ids = resolve_technology_ids(state.store.as_ref(), &body.technologies).await?;
    let tag_ids = resolve_tag_ids(state.store.as_ref(), &body.tags).await?;

    let detail = state
        .store
        .create_component(NewComponent {
            name: body.name,
            description: body.description,
            code: body.code,
            preview_url: body.preview_url,
            status,
            user_id,
            technology_ids,
            tag_ids,
            published_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Partially update a component. Owner only; supplied fields change, the
/// rest stay. A supplied technologies/tags list replaces the whole link set.
#[utoipa::path(
    patch,
    path = "/components/{id}",
    params(("id" = Uuid, Path, description = "Component id")),
    request_body = UpdateComponentRequest,
    responses(
        (status = 200, description = "Updated component", body = ComponentEnvelope),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No component with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_component_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateComponentRequest>,
) -> Result<Json<ComponentEnvelope>, ApiError> {
    let meta = check_ownership(state.store.as_ref(), id, user_id, "edit").await?;

    let status = match body.status.as_deref() {
        None => None,
        Some(raw) => Some(parse_status(raw)?),
    };
    // The first transition into PUBLISHED stamps the timestamp. Once set it
    // is never written again.
    let published_at = match status {
        Some(ComponentStatus::Published) if meta.published_at.is_none() => Some(Utc::now()),
        _ => None,
    };

    let technology_ids = match &body.technologies {
        Some(names) if !names.is_empty() => {
            Some(resolve_technology_ids(state.store.as_ref(), names).await?)
        }
        _ => None,
    };
    let tag_ids = match &body.tags {
        Some(names) if !names.is_empty() => {
            Some(resolve_tag_ids(state.store.as_ref(), names).await?)
        }
        _ => None,
    };

    let detail = state
        .store
        .update_component(
            id,
            ComponentChanges {
                name: body.name.filter(|n| !n.is_empty()),
                description: body.description,
                code: body.code.filter(|c| !c.is_empty()),
                preview_url: body.preview_url,
                status,
                published_at,
                technology_ids,
                tag_ids,
            },
        )
        .await?;

    Ok(Json(ComponentEnvelope {
        component: detail.into(),
    }))
}

/// Delete a component. Owner only; likes and links cascade, shared
/// technologies and tags survive.
#[utoipa::path(
    delete,
    path = "/components/{id}",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No component with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_component_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_ownership(state.store.as_ref(), id, user_id, "delete").await?;
    state.store.delete_component(id).await?;

    Ok(Json(MessageResponse {
        message: "Component deleted successfully".to_string(),
    }))
}
