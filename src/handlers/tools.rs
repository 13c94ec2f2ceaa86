//! Read-only views of the normalized contract and the tools built from it.

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::tools::ToolDefinition;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// GET /openapi.json - The contract after reference resolution and response cleanup.
pub async fn openapi_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    ensure_ready(&state)?;
    Ok(Json(state.schema.as_value().clone()))
}

/// GET /tools - Every tool derived from the contract, in document order.
pub async fn list_tools_handler(State(state): State<Arc<AppState>>) -> Result<Json<ToolsResponse>> {
    ensure_ready(&state)?;

    metrics::counter!("tool_list_requests_total").increment(1);

    Ok(Json(ToolsResponse {
        tools: state.tools.tools().to_vec(),
    }))
}

/// GET /tools/:name - A single tool definition.
pub async fn get_tool_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ToolDefinition>> {
    ensure_ready(&state)?;

    state
        .tools
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("No tool named '{}'", name)))
}

fn ensure_ready(state: &AppState) -> Result<()> {
    if state.is_ready() {
        Ok(())
    } else {
        Err(AppError::ResourceError(
            "No OpenAPI contract loaded. Set OPENAPI_SPEC environment variable.".to_string(),
        ))
    }
}
