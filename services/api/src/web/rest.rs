//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, aggregating the
//! handler annotations from the individual route modules.

use utoipa::OpenApi;

use crate::web::{components, generate, likes, technologies};

#[derive(OpenApi)]
#[openapi(
    paths(
        components::list_components_handler,
        components::get_component_handler,
        components::create_component_handler,
        components::update_component_handler,
        components::delete_component_handler,
        likes::like_status_handler,
        likes::toggle_like_handler,
        technologies::list_technologies_handler,
        generate::generate_code_handler,
    ),
    components(
        schemas(
            components::ComponentResponse,
            components::ComponentListResponse,
            components::ComponentEnvelope,
            components::MessageResponse,
            components::CreateComponentRequest,
            components::UpdateComponentRequest,
            components::UserSummary,
            components::NamedEntity,
            likes::LikeStatusResponse,
            likes::LikeToggleResponse,
            technologies::TechnologyResponse,
            generate::GenerateRequest,
            generate::GenerateResponse,
        )
    ),
    tags(
        (name = "Component Gallery API", description = "API endpoints for browsing, creating and sharing AI-generated UI components.")
    )
)]
pub struct ApiDoc;
