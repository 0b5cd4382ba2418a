pub mod components;
pub mod generate;
pub mod likes;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod technologies;

#[cfg(test)]
pub mod testing;

// Re-export the handlers the binary wires into the router.
pub use components::{
    create_component_handler, delete_component_handler, get_component_handler,
    list_components_handler, update_component_handler,
};
pub use generate::generate_code_handler;
pub use likes::{like_status_handler, toggle_like_handler};
pub use middleware::require_auth;
pub use technologies::list_technologies_handler;
