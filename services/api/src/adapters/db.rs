//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ComponentStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gallery_core::domain::{
    Component, ComponentChanges, ComponentDetail, ComponentFilter, ComponentMeta, NewComponent,
    SortKey, Tag, Technology, User,
};
use gallery_core::ports::{ComponentStore, PortError, PortResult};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ComponentStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ComponentRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    code: String,
    preview_url: Option<String>,
    status: String,
    view_count: i32,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl ComponentRecord {
    fn to_domain(self) -> PortResult<Component> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| PortError::Unexpected(e))?;
        Ok(Component {
            id: self.id,
            name: self.name,
            description: self.description,
            code: self.code,
            preview_url: self.preview_url,
            status,
            view_count: self.view_count,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
        })
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: Option<String>,
    username: Option<String>,
    image: Option<String>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            username: self.username,
            image: self.image,
        }
    }
}

#[derive(FromRow)]
struct NamedRecord {
    id: Uuid,
    name: String,
}

/// One linked technology/tag row, keyed back to its component for batched
/// assembly of a listing page.
#[derive(FromRow)]
struct LinkedRecord {
    component_id: Uuid,
    id: Uuid,
    name: String,
}

#[derive(FromRow)]
struct LikeCountRecord {
    component_id: Uuid,
    count: i64,
}

#[derive(FromRow)]
struct AuthSessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

//=========================================================================================
// Query Assembly Helpers
//=========================================================================================

/// Appends the shared WHERE clause for listing and counting.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a ComponentFilter) {
    builder.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }

    if let Some(technology) = &filter.technology {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM component_technologies ct \
                 JOIN technologies t ON t.id = ct.technology_id \
                 WHERE ct.component_id = components.id AND t.name = ",
            )
            .push_bind(technology)
            .push(")");
    }

    if let Some(tag) = &filter.tag {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM component_tags ct \
                 JOIN tags t ON t.id = ct.tag_id \
                 WHERE ct.component_id = components.id AND t.name = ",
            )
            .push_bind(tag)
            .push(")");
    }
}

const COMPONENT_COLUMNS: &str = "id, name, description, code, preview_url, status, view_count, \
                                 user_id, created_at, updated_at, published_at";

impl PgStore {
    /// Joins a page of component rows with their owners, linked entities and
    /// like counts. Batched with `= ANY(..)` to keep a page at a fixed number
    /// of queries instead of N+1.
    async fn assemble_details(
        &self,
        records: Vec<ComponentRecord>,
    ) -> PortResult<Vec<ComponentDetail>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let component_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let owner_ids: Vec<Uuid> = records.iter().map(|r| r.user_id).collect();

        let owners = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, username, image FROM users WHERE id = ANY($1)",
        )
        .bind(&owner_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        let owners: HashMap<Uuid, User> =
            owners.into_iter().map(|u| (u.id, u.to_domain())).collect();

        let technologies = sqlx::query_as::<_, LinkedRecord>(
            "SELECT ct.component_id, t.id, t.name FROM component_technologies ct \
             JOIN technologies t ON t.id = ct.technology_id \
             WHERE ct.component_id = ANY($1) ORDER BY t.name ASC",
        )
        .bind(&component_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        let mut technologies_by_component: HashMap<Uuid, Vec<Technology>> = HashMap::new();
        for row in technologies {
            technologies_by_component
                .entry(row.component_id)
                .or_default()
                .push(Technology {
                    id: row.id,
                    name: row.name,
                });
        }

        let tags = sqlx::query_as::<_, LinkedRecord>(
            "SELECT ct.component_id, t.id, t.name FROM component_tags ct \
             JOIN tags t ON t.id = ct.tag_id \
             WHERE ct.component_id = ANY($1) ORDER BY t.name ASC",
        )
        .bind(&component_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        let mut tags_by_component: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in tags {
            tags_by_component
                .entry(row.component_id)
                .or_default()
                .push(Tag {
                    id: row.id,
                    name: row.name,
                });
        }

        let like_counts = sqlx::query_as::<_, LikeCountRecord>(
            "SELECT component_id, COUNT(*) AS count FROM likes \
             WHERE component_id = ANY($1) GROUP BY component_id",
        )
        .bind(&component_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        let like_counts: HashMap<Uuid, i64> = like_counts
            .into_iter()
            .map(|r| (r.component_id, r.count))
            .collect();

        let mut details = Vec::with_capacity(records.len());
        for record in records {
            let user = owners.get(&record.user_id).cloned().ok_or_else(|| {
                PortError::Unexpected(format!("Owner {} missing for component", record.user_id))
            })?;
            let id = record.id;
            details.push(ComponentDetail {
                component: record.to_domain()?,
                user,
                technologies: technologies_by_component.remove(&id).unwrap_or_default(),
                tags: tags_by_component.remove(&id).unwrap_or_default(),
                like_count: like_counts.get(&id).copied().unwrap_or(0),
            });
        }
        Ok(details)
    }

    async fn replace_links(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        table: &str,
        column: &str,
        component_id: Uuid,
        entity_ids: &[Uuid],
    ) -> PortResult<()> {
        sqlx::query(&format!("DELETE FROM {table} WHERE component_id = $1"))
            .bind(component_id)
            .execute(&mut **tx)
            .await
            .map_err(unexpected)?;
        for entity_id in entity_ids {
            sqlx::query(&format!(
                "INSERT INTO {table} (component_id, {column}) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING"
            ))
            .bind(component_id)
            .bind(entity_id)
            .execute(&mut **tx)
            .await
            .map_err(unexpected)?;
        }
        Ok(())
    }

    /// The `INSERT .. ON CONFLICT DO NOTHING` + re-read upsert used for both
    /// technologies and tags: a conflict means someone else created the name
    /// concurrently, so the re-read links to that row.
    async fn find_or_create_named(&self, table: &str, name: &str) -> PortResult<NamedRecord> {
        sqlx::query(&format!(
            "INSERT INTO {table} (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        sqlx::query_as::<_, NamedRecord>(&format!(
            "SELECT id, name FROM {table} WHERE name = $1"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }
}

//=========================================================================================
// `ComponentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ComponentStore for PgStore {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;

        if record.expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(record.user_id)
    }

    async fn list_components(&self, filter: &ComponentFilter) -> PortResult<Vec<ComponentDetail>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMPONENT_COLUMNS} FROM components"
        ));
        push_filters(&mut builder, filter);
        match filter.sort {
            SortKey::Newest => builder.push(" ORDER BY created_at DESC"),
            SortKey::Oldest => builder.push(" ORDER BY created_at ASC"),
            SortKey::Popular => builder.push(" ORDER BY view_count DESC"),
            SortKey::Name => builder.push(" ORDER BY name ASC"),
        };
        builder
            .push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let records = builder
            .build_query_as::<ComponentRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        self.assemble_details(records).await
    }

    async fn count_components(&self, filter: &ComponentFilter) -> PortResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM components");
        push_filters(&mut builder, filter);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn get_component(&self, id: Uuid) -> PortResult<ComponentDetail> {
        let record = sqlx::query_as::<_, ComponentRecord>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM components WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Component {} not found", id)))?;

        let mut details = self.assemble_details(vec![record]).await?;
        Ok(details.remove(0))
    }

    async fn get_component_meta(&self, id: Uuid) -> PortResult<ComponentMeta> {
        let row = sqlx::query_as::<_, (Uuid, Option<DateTime<Utc>>)>(
            "SELECT user_id, published_at FROM components WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Component {} not found", id)))?;

        Ok(ComponentMeta {
            user_id: row.0,
            published_at: row.1,
        })
    }

    async fn increment_view_count(&self, id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE components SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_component(&self, new: NewComponent) -> PortResult<ComponentDetail> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO components \
             (id, name, description, code, preview_url, status, user_id, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.code)
        .bind(&new.preview_url)
        .bind(new.status.as_str())
        .bind(new.user_id)
        .bind(new.published_at)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        Self::replace_links(
            &mut tx,
            "component_technologies",
            "technology_id",
            id,
            &new.technology_ids,
        )
        .await?;
        Self::replace_links(&mut tx, "component_tags", "tag_id", id, &new.tag_ids).await?;

        tx.commit().await.map_err(unexpected)?;
        self.get_component(id).await
    }

    async fn update_component(
        &self,
        id: Uuid,
        changes: ComponentChanges,
    ) -> PortResult<ComponentDetail> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE components SET updated_at = now()");
        if let Some(name) = &changes.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(code) = &changes.code {
            builder.push(", code = ").push_bind(code);
        }
        if let Some(preview_url) = &changes.preview_url {
            builder.push(", preview_url = ").push_bind(preview_url);
        }
        if let Some(status) = changes.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        if let Some(published_at) = changes.published_at {
            // Only the first publish may write the stamp, even under
            // concurrent updates.
            builder
                .push(", published_at = COALESCE(published_at, ")
                .push_bind(published_at)
                .push(")");
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        if let Some(technology_ids) = &changes.technology_ids {
            Self::replace_links(
                &mut tx,
                "component_technologies",
                "technology_id",
                id,
                technology_ids,
            )
            .await?;
        }
        if let Some(tag_ids) = &changes.tag_ids {
            Self::replace_links(&mut tx, "component_tags", "tag_id", id, tag_ids).await?;
        }

        tx.commit().await.map_err(unexpected)?;
        self.get_component(id).await
    }

    async fn delete_component(&self, id: Uuid) -> PortResult<()> {
        // Link and like rows go with the component via ON DELETE CASCADE;
        // shared technology/tag rows are untouched.
        sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_or_create_technology(&self, name: &str) -> PortResult<Technology> {
        let record = self.find_or_create_named("technologies", name).await?;
        Ok(Technology {
            id: record.id,
            name: record.name,
        })
    }

    async fn find_or_create_tag(&self, name: &str) -> PortResult<Tag> {
        let record = self.find_or_create_named("tags", name).await?;
        Ok(Tag {
            id: record.id,
            name: record.name,
        })
    }

    async fn list_technologies(&self) -> PortResult<Vec<Technology>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            "SELECT id, name FROM technologies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| Technology {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn like_exists(&self, component_id: Uuid, user_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE component_id = $1 AND user_id = $2)",
        )
        .bind(component_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn insert_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO likes (component_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(component_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM likes WHERE component_id = $1 AND user_id = $2")
            .bind(component_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn count_likes(&self, component_id: Uuid) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE component_id = $1")
            .bind(component_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }
}
