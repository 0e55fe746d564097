pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::credentials::handlers as credential_handlers;
use crate::generation::handlers as generation_handlers;
use crate::page::handlers as page_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Credential API
        .route(
            "/api/v1/credential",
            get(credential_handlers::handle_status)
                .put(credential_handlers::handle_save)
                .delete(credential_handlers::handle_clear),
        )
        // Page API
        .route("/api/v1/pages/example", get(page_handlers::handle_example))
        .route("/api/v1/pages/validate", post(page_handlers::handle_validate))
        .route("/api/v1/pages/prompt", post(page_handlers::handle_prompt))
        .route(
            "/api/v1/pages/generate",
            post(generation_handlers::handle_generate),
        )
        .with_state(state)
}
