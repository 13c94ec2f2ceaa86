use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Number of tools built from the loaded contract
    pub tools: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// GET /health - Liveness probe
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - Readiness probe. 503 until an OpenAPI contract has been loaded.
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadyResponse>) {
    let (status_code, status) = if state.is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let body = ReadyResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        tools: state.tools.len(),
        title: state
            .is_ready()
            .then(|| state.schema.title().map(str::to_string))
            .flatten(),
    };

    (status_code, Json(body))
}
