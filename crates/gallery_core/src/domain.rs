//! crates/gallery_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

/// Publication state of a component.
///
/// Every transition between states is allowed; only the first transition
/// into `Published` stamps `published_at` on the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Draft,
    Published,
    Archived,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Draft => "DRAFT",
            ComponentStatus::Published => "PUBLISHED",
            ComponentStatus::Archived => "ARCHIVED",
        }
    }
}

impl FromStr for ComponentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ComponentStatus::Draft),
            "PUBLISHED" => Ok(ComponentStatus::Published),
            "ARCHIVED" => Ok(ComponentStatus::Archived),
            other => Err(format!("'{}' is not a valid component status", other)),
        }
    }
}

/// Sort order for component listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Popular,
    Name,
}

impl SortKey {
    /// Parses a sort query parameter. Unknown values fall back to `Newest`,
    /// matching the listing endpoint's default.
    pub fn parse(s: &str) -> Self {
        match s {
            "newest" => SortKey::Newest,
            "oldest" => SortKey::Oldest,
            "popular" => SortKey::Popular,
            "name" => SortKey::Name,
            _ => SortKey::Newest,
        }
    }
}

// Represents a user - created by the external identity provider, never
// mutated by this service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
}

/// A shared technology, referenced by components. Created implicitly via
/// find-or-create whenever a component names it.
#[derive(Debug, Clone)]
pub struct Technology {
    pub id: Uuid,
    pub name: String,
}

/// A shared tag. Same lifecycle as [`Technology`].
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// A UI component as stored.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub preview_url: Option<String>,
    pub status: ComponentStatus,
    pub view_count: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// A component together with its owner summary, linked entities, and
/// aggregate like count, as returned by listings and detail fetches.
#[derive(Debug, Clone)]
pub struct ComponentDetail {
    pub component: Component,
    pub user: User,
    pub technologies: Vec<Technology>,
    pub tags: Vec<Tag>,
    pub like_count: i64,
}

/// Owner and publish stamp of a component, fetched for the pre-mutation
/// checks before anything else is touched.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta {
    pub user_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
}

/// Input for component creation. `technology_ids` / `tag_ids` are already
/// resolved through find-or-create.
#[derive(Debug, Clone)]
pub struct NewComponent {
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub preview_url: Option<String>,
    pub status: ComponentStatus,
    pub user_id: Uuid,
    pub technology_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update for a component. Only `Some` fields change; link id sets,
/// when present, fully replace the existing links.
#[derive(Debug, Clone, Default)]
pub struct ComponentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub preview_url: Option<String>,
    pub status: Option<ComponentStatus>,
    pub published_at: Option<DateTime<Utc>>,
    pub technology_ids: Option<Vec<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Filter and window for component listings.
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    /// `None` means all statuses (the caller asked for "ALL").
    pub status: Option<ComponentStatus>,
    /// Case-insensitive substring match over name OR description.
    pub search: Option<String>,
    /// Requires at least one linked technology with this exact name.
    pub technology: Option<String>,
    /// Requires at least one linked tag with this exact name.
    pub tag: Option<String>,
    /// Restricts to a single owner's components (dashboard view).
    pub user_id: Option<Uuid>,
    pub sort: SortKey,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ComponentStatus::Draft,
            ComponentStatus::Published,
            ComponentStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<ComponentStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("published".parse::<ComponentStatus>().is_err());
        assert!("".parse::<ComponentStatus>().is_err());
    }

    #[test]
    fn unknown_sort_falls_back_to_newest() {
        assert_eq!(SortKey::parse("popular"), SortKey::Popular);
        assert_eq!(SortKey::parse("name"), SortKey::Name);
        assert_eq!(SortKey::parse("trending"), SortKey::Newest);
    }
}
