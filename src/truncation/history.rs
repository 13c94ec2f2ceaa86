//! Applies the content budget to tool messages in a conversation history.

use crate::truncation::budget::{truncate_by_length, TruncationOutcome};
use serde::{Deserialize, Serialize};

/// Role carried by messages that hold tool output.
pub const TOOL_ROLE: &str = "tool";

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn is_tool_output(&self) -> bool {
        self.role == TOOL_ROLE
    }
}

/// Shrink every tool message longer than `max_length` characters.
///
/// Other messages, and tool messages already within budget, pass through
/// untouched. Order is preserved.
pub fn truncate_tool_messages(
    messages: Vec<ChatMessage>,
    max_length: usize,
    threshold: usize,
) -> Vec<ChatMessage> {
    let mut shrunk = 0usize;

    let messages: Vec<ChatMessage> = messages
        .into_iter()
        .map(|message| {
            if !message.is_tool_output() || message.content.chars().count() <= max_length {
                return message;
            }

            let truncated = truncate_by_length(&message.content, max_length, threshold);
            if truncated.outcome != TruncationOutcome::Unchanged {
                shrunk += 1;
            }
            ChatMessage {
                content: truncated.content,
                ..message
            }
        })
        .collect();

    if shrunk > 0 {
        tracing::debug!(shrunk, total = messages.len(), "Truncated tool messages");
    }

    messages
}
