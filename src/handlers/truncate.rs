use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::truncation::{truncate_by_length, truncate_tool_messages, ChatMessage, TruncationOutcome};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct TruncateRequest {
    pub content: String,
    /// Overrides the configured content budget for this request.
    pub max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TruncateResponse {
    pub content: String,
    pub outcome: TruncationOutcome,
    pub original_length: usize,
    pub length: usize,
    pub fields_truncated: usize,
}

#[derive(Debug, Deserialize)]
pub struct TruncateMessagesRequest {
    pub messages: Vec<ChatMessage>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TruncateMessagesResponse {
    pub messages: Vec<ChatMessage>,
}

/// POST /truncate - Fit one tool output payload into the content budget.
///
/// # Flow
/// 1. Validate the budget
/// 2. Shrink oversized string fields, largest first
/// 3. Fall back to cutting the raw payload when fields are not enough
pub async fn truncate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TruncateRequest>,
) -> Result<Json<TruncateResponse>> {
    let max_length = resolve_budget(&state, request.max_length)?;
    let threshold = state.config.truncation_threshold;
    let content = request.content;

    let truncated = tokio::task::spawn_blocking(move || {
        truncate_by_length(&content, max_length, threshold)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Task join error: {}", e)))?;

    let length = truncated.length();
    tracing::debug!(
        outcome = truncated.outcome.as_str(),
        original_length = truncated.original_length,
        length,
        max_length,
        "Truncation completed"
    );

    metrics::counter!("truncation_requests_total", "outcome" => truncated.outcome.as_str())
        .increment(1);
    metrics::histogram!("truncation_removed_chars")
        .record(truncated.original_length.saturating_sub(length) as f64);

    Ok(Json(TruncateResponse {
        length,
        original_length: truncated.original_length,
        fields_truncated: truncated.fields_truncated,
        outcome: truncated.outcome,
        content: truncated.content,
    }))
}

/// POST /messages/truncate - Apply the content budget to every tool message.
pub async fn truncate_messages_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TruncateMessagesRequest>,
) -> Result<Json<TruncateMessagesResponse>> {
    let max_length = resolve_budget(&state, request.max_length)?;
    let threshold = state.config.truncation_threshold;
    let total = request.messages.len();
    let messages = request.messages;

    let messages = tokio::task::spawn_blocking(move || {
        truncate_tool_messages(messages, max_length, threshold)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Task join error: {}", e)))?;

    metrics::counter!("history_truncation_requests_total").increment(1);
    metrics::histogram!("history_message_count").record(total as f64);

    Ok(Json(TruncateMessagesResponse { messages }))
}

fn resolve_budget(state: &AppState, requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(0) => Err(AppError::ValidationError(
            "max_length must be at least 1".to_string(),
        )),
        Some(max_length) => Ok(max_length),
        None => Ok(state.config.max_content_length),
    }
}
