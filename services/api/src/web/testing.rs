//! services/api/src/web/testing.rs
//!
//! Test doubles for the service ports: an in-memory `ComponentStore` and a
//! scriptable `CodeGenerationModel`, plus constructors for a test `AppState`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use gallery_core::domain::{
    Component, ComponentChanges, ComponentDetail, ComponentFilter, ComponentMeta, ComponentStatus,
    NewComponent, SortKey, Tag, Technology, User,
};
use gallery_core::ports::{CodeGenerationModel, ComponentStore, PortError, PortResult};
use uuid::Uuid;

use crate::config::Config;
use crate::web::state::AppState;

#[derive(Default)]
struct Inner {
    components: Vec<Component>,
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Uuid>,
    technologies: Vec<Technology>,
    tags: Vec<Tag>,
    technology_links: Vec<(Uuid, Uuid)>,
    tag_links: Vec<(Uuid, Uuid)>,
    likes: Vec<(Uuid, Uuid)>,
}

/// An in-memory `ComponentStore` mirroring the relational semantics the
/// Postgres adapter gets from its schema (cascading deletes, pair
/// uniqueness, shared technology/tag rows).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn seed_session(&self, session_id: &str, user_id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        ensure_user(&mut inner, user_id);
        inner.sessions.insert(session_id.to_string(), user_id);
    }

    pub fn seed_technology(&self, name: &str) -> Uuid {
        let mut inner = self.inner.lock().unwrap();
        find_or_create_named(&mut inner.technologies, name)
    }

    /// Inserts a published component directly, bypassing the handlers.
    pub fn seed_published_component(&self, owner: Uuid) -> Uuid {
        let mut inner = self.inner.lock().unwrap();
        ensure_user(&mut inner, owner);
        let id = Uuid::new_v4();
        let now = Utc::now();
        inner.components.push(Component {
            id,
            name: "Seeded".to_string(),
            description: None,
            code: "<div />".to_string(),
            preview_url: None,
            status: ComponentStatus::Published,
            view_count: 0,
            user_id: owner,
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        });
        id
    }

    pub fn insert_like_sync(&self, component_id: Uuid, user_id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.likes.contains(&(component_id, user_id)) {
            inner.likes.push((component_id, user_id));
        }
    }

    pub fn technology_names(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.technologies.iter().map(|t| t.name.clone()).collect()
    }

    pub fn like_pairs(&self) -> Vec<(Uuid, Uuid)> {
        self.inner.lock().unwrap().likes.clone()
    }

    /// All link rows, technologies and tags together.
    pub fn link_pairs(&self) -> Vec<(Uuid, Uuid)> {
        let inner = self.inner.lock().unwrap();
        let mut pairs = inner.technology_links.clone();
        pairs.extend(inner.tag_links.iter().copied());
        pairs
    }
}

fn ensure_user(inner: &mut Inner, user_id: Uuid) {
    inner.users.entry(user_id).or_insert_with(|| User {
        id: user_id,
        name: Some("Test User".to_string()),
        username: Some("testuser".to_string()),
        image: None,
    });
}

fn find_or_create_named(entities: &mut Vec<Technology>, name: &str) -> Uuid {
    if let Some(existing) = entities.iter().find(|t| t.name == name) {
        return existing.id;
    }
    let id = Uuid::new_v4();
    entities.push(Technology {
        id,
        name: name.to_string(),
    });
    id
}

fn not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Component {} not found", id))
}

fn matches(inner: &Inner, component: &Component, filter: &ComponentFilter) -> bool {
    if let Some(status) = filter.status {
        if component.status != status {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let in_name = component.name.to_lowercase().contains(&needle);
        let in_description = component
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !in_name && !in_description {
            return false;
        }
    }
    if let Some(user_id) = filter.user_id {
        if component.user_id != user_id {
            return false;
        }
    }
    if let Some(technology) = &filter.technology {
        let linked = inner.technology_links.iter().any(|(cid, tid)| {
            *cid == component.id
                && inner
                    .technologies
                    .iter()
                    .any(|t| t.id == *tid && t.name == *technology)
        });
        if !linked {
            return false;
        }
    }
    if let Some(tag) = &filter.tag {
        let linked = inner.tag_links.iter().any(|(cid, tid)| {
            *cid == component.id && inner.tags.iter().any(|t| t.id == *tid && t.name == *tag)
        });
        if !linked {
            return false;
        }
    }
    true
}

fn detail(inner: &Inner, component: &Component) -> ComponentDetail {
    let mut technologies: Vec<Technology> = inner
        .technology_links
        .iter()
        .filter(|(cid, _)| *cid == component.id)
        .filter_map(|(_, tid)| inner.technologies.iter().find(|t| t.id == *tid).cloned())
        .collect();
    technologies.sort_by(|a, b| a.name.cmp(&b.name));

    let mut tags: Vec<Tag> = inner
        .tag_links
        .iter()
        .filter(|(cid, _)| *cid == component.id)
        .filter_map(|(_, tid)| inner.tags.iter().find(|t| t.id == *tid).cloned())
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let user = inner
        .users
        .get(&component.user_id)
        .cloned()
        .unwrap_or(User {
            id: component.user_id,
            name: None,
            username: None,
            image: None,
        });

    ComponentDetail {
        component: component.clone(),
        user,
        technologies,
        tags,
        like_count: inner
            .likes
            .iter()
            .filter(|(cid, _)| *cid == component.id)
            .count() as i64,
    }
}

#[async_trait]
impl ComponentStore for MemoryStore {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn list_components(&self, filter: &ComponentFilter) -> PortResult<Vec<ComponentDetail>> {
        let inner = self.inner.lock().unwrap();
        let mut selected: Vec<&Component> = inner
            .components
            .iter()
            .filter(|c| matches(&inner, c, filter))
            .collect();
        match filter.sort {
            SortKey::Newest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::Oldest => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortKey::Popular => selected.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
            SortKey::Name => selected.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        Ok(selected
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .map(|c| detail(&inner, c))
            .collect())
    }

    async fn count_components(&self, filter: &ComponentFilter) -> PortResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .components
            .iter()
            .filter(|c| matches(&inner, c, filter))
            .count() as i64)
    }

    async fn get_component(&self, id: Uuid) -> PortResult<ComponentDetail> {
        let inner = self.inner.lock().unwrap();
        inner
            .components
            .iter()
            .find(|c| c.id == id)
            .map(|c| detail(&inner, c))
            .ok_or_else(|| not_found(id))
    }

    async fn get_component_meta(&self, id: Uuid) -> PortResult<ComponentMeta> {
        let inner = self.inner.lock().unwrap();
        inner
            .components
            .iter()
            .find(|c| c.id == id)
            .map(|c| ComponentMeta {
                user_id: c.user_id,
                published_at: c.published_at,
            })
            .ok_or_else(|| not_found(id))
    }

    async fn increment_view_count(&self, id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let component = inner
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(id))?;
        component.view_count += 1;
        Ok(())
    }

    async fn create_component(&self, new: NewComponent) -> PortResult<ComponentDetail> {
        let mut inner = self.inner.lock().unwrap();
        ensure_user(&mut inner, new.user_id);
        let id = Uuid::new_v4();
        let now = Utc::now();
        inner.components.push(Component {
            id,
            name: new.name,
            description: new.description,
            code: new.code,
            preview_url: new.preview_url,
            status: new.status,
            view_count: 0,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
            published_at: new.published_at,
        });
        for technology_id in new.technology_ids {
            inner.technology_links.push((id, technology_id));
        }
        for tag_id in new.tag_ids {
            inner.tag_links.push((id, tag_id));
        }
        let component = inner.components.last().unwrap().clone();
        Ok(detail(&inner, &component))
    }

    async fn update_component(
        &self,
        id: Uuid,
        changes: ComponentChanges,
    ) -> PortResult<ComponentDetail> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(id))?;

        {
            let component = &mut inner.components[index];
            if let Some(name) = changes.name {
                component.name = name;
            }
            if let Some(description) = changes.description {
                component.description = Some(description);
            }
            if let Some(code) = changes.code {
                component.code = code;
            }
            if let Some(preview_url) = changes.preview_url {
                component.preview_url = Some(preview_url);
            }
            if let Some(status) = changes.status {
                component.status = status;
            }
            if let Some(published_at) = changes.published_at {
                component.published_at = Some(published_at);
            }
            component.updated_at = Utc::now();
        }

        if let Some(technology_ids) = changes.technology_ids {
            inner.technology_links.retain(|(cid, _)| *cid != id);
            for technology_id in technology_ids {
                inner.technology_links.push((id, technology_id));
            }
        }
        if let Some(tag_ids) = changes.tag_ids {
            inner.tag_links.retain(|(cid, _)| *cid != id);
            for tag_id in tag_ids {
                inner.tag_links.push((id, tag_id));
            }
        }

        let component = inner.components[index].clone();
        Ok(detail(&inner, &component))
    }

    async fn delete_component(&self, id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.components.retain(|c| c.id != id);
        inner.technology_links.retain(|(cid, _)| *cid != id);
        inner.tag_links.retain(|(cid, _)| *cid != id);
        inner.likes.retain(|(cid, _)| *cid != id);
        Ok(())
    }

    async fn find_or_create_technology(&self, name: &str) -> PortResult<Technology> {
        let mut inner = self.inner.lock().unwrap();
        let id = find_or_create_named(&mut inner.technologies, name);
        Ok(Technology {
            id,
            name: name.to_string(),
        })
    }

    async fn find_or_create_tag(&self, name: &str) -> PortResult<Tag> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.tags.iter().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        inner.tags.push(tag.clone());
        Ok(tag)
    }

    async fn list_technologies(&self) -> PortResult<Vec<Technology>> {
        let inner = self.inner.lock().unwrap();
        let mut technologies = inner.technologies.clone();
        technologies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(technologies)
    }

    async fn like_exists(&self, component_id: Uuid, user_id: Uuid) -> PortResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.likes.contains(&(component_id, user_id)))
    }

    async fn insert_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.likes.contains(&(component_id, user_id)) {
            inner.likes.push((component_id, user_id));
        }
        Ok(())
    }

    async fn delete_like(&self, component_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.likes.retain(|pair| *pair != (component_id, user_id));
        Ok(())
    }

    async fn count_likes(&self, component_id: Uuid) -> PortResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .likes
            .iter()
            .filter(|(cid, _)| *cid == component_id)
            .count() as i64)
    }
}

/// A `CodeGenerationModel` that answers with a fixed text, or always fails.
pub struct StubModel {
    answer: Option<String>,
}

impl StubModel {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl CodeGenerationModel for StubModel {
    async fn generate(&self, _instruction: &str) -> PortResult<String> {
        self.answer
            .clone()
            .ok_or_else(|| PortError::Unexpected("model unavailable".to_string()))
    }
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        openai_api_key: None,
        codegen_model: "test-model".to_string(),
    }
}

/// Builds an `AppState` over a fresh in-memory store, returning the store
/// handle too so tests can seed and inspect it.
pub fn state_with_store() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = Arc::new(AppState {
        store: store.clone(),
        codegen: Arc::new(StubModel::failing()),
        config: Arc::new(test_config()),
    });
    (state, store)
}

/// Builds an `AppState` with a scripted generation model.
pub fn state_with_model(model: StubModel) -> Arc<AppState> {
    let (state, _) = state_with_store();
    Arc::new(AppState {
        store: state.store.clone(),
        codegen: Arc::new(model),
        config: state.config.clone(),
    })
}

/// Seeds one published component and returns its id.
pub fn seeded_component(store: &MemoryStore) -> Uuid {
    store.seed_published_component(Uuid::new_v4())
}
