pub mod health;
pub mod tools;
pub mod truncate;

pub use health::{health_handler, ready_handler};
pub use tools::{get_tool_handler, list_tools_handler, openapi_handler};
pub use truncate::{truncate_handler, truncate_messages_handler};

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Application routes without middleware or the metrics endpoint.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        // Truncation endpoints take whole tool outputs, so they get a larger body limit
        .route(
            "/truncate",
            post(truncate_handler).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/messages/truncate",
            post(truncate_messages_handler).layer(DefaultBodyLimit::max(body_limit)),
        )
        // Contract and tools
        .route("/openapi.json", get(openapi_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", get(get_tool_handler))
        // Health endpoints
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}
