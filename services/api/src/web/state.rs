//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use gallery_core::ports::{CodeGenerationModel, ComponentStore};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is no other cross-request state: every request re-reads the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ComponentStore>,
    pub codegen: Arc<dyn CodeGenerationModel>,
    pub config: Arc<Config>,
}
