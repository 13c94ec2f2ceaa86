//! Message-truncation pipeline.
//!
//! Oversized tool output is located by [`collector`] and shrunk by [`budget`]
//! until it fits the content budget. [`history`] applies the same budget to
//! every tool message in a conversation.

pub mod budget;
pub mod collector;
pub mod history;

pub use budget::{
    hard_truncate, shrink_fields, truncate_by_length, ShrinkReport, Truncated, TruncationOutcome,
    FALLBACK_MARKER, INDIVIDUAL_MIN_LENGTH,
};
pub use collector::{collect_long_strings, FieldRef};
pub use history::{truncate_tool_messages, ChatMessage, TOOL_ROLE};
