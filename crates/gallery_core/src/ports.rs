//! crates/gallery_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ComponentChanges, ComponentDetail, ComponentFilter, ComponentMeta, NewComponent, Tag,
    Technology,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ComponentStore: Send + Sync {
    // --- Auth Gate ---
    /// Resolves a session cookie (issued by the external identity provider)
    /// to a user id. Fails with `Unauthorized` for unknown or expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    // --- Component Listing / Reading ---
    /// Returns one window of components matching the filter.
    async fn list_components(&self, filter: &ComponentFilter) -> PortResult<Vec<ComponentDetail>>;

    /// Counts all components matching the filter, ignoring its window.
    async fn count_components(&self, filter: &ComponentFilter) -> PortResult<i64>;

    async fn get_component(&self, id: Uuid) -> PortResult<ComponentDetail>;

    /// Fetches just the owner and publish stamp of a component, for the
    /// pre-mutation checks.
    async fn get_component_meta(&self, id: Uuid) -> PortResult<ComponentMeta>;

    /// Bumps the view counter by one. Any caller, authenticated or not.
    async fn increment_view_count(&self, id: Uuid) -> PortResult<()>;

    // --- Component Mutation ---
    async fn create_component(&self, new: NewComponent) -> PortResult<ComponentDetail>;

    async fn update_component(
        &self,
        id: Uuid,
        changes: ComponentChanges,
    ) -> PortResult<ComponentDetail>;

    /// Deletes a component. Like rows and link rows go with it; shared
    /// technology/tag rows stay.
    async fn delete_component(&self, id: Uuid) -> PortResult<()>;

    // --- Technologies / Tags ---
    /// Idempotent upsert by name. Concurrent calls for the same new name are
    /// resolved by the store's uniqueness constraint, not by locking.
    async fn find_or_create_technology(&self, name: &str) -> PortResult<Technology>;

    async fn find_or_create_tag(&self, name: &str) -> PortResult<Tag>;

    async fn list_technologies(&self) -> PortResult<Vec<Technology>>;

    // --- Likes ---
    async fn like_exists(&self, component_id: Uuid, user_id: Uuid) -> PortResult<bool>;

    /// Inserts a like row. A concurrent duplicate insert for the same pair is
    /// a no-op (pair uniqueness at the store level).
    async fn insert_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()>;

    async fn delete_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()>;

    async fn count_likes(&self, component_id: Uuid) -> PortResult<i64>;
}

#[async_trait]
pub trait CodeGenerationModel: Send + Sync {
    /// Sends a component-generation instruction to the external model and
    /// returns its raw text response. Single attempt, no retry; callers
    /// degrade through the fallback tiers on failure.
    async fn generate(&self, instruction: &str) -> PortResult<String>;
}
