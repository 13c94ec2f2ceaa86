//! Tool module for turning the normalized contract into callable tools.
//!
//! One tool is generated per OpenAPI operation. Tools are built once at
//! startup and served read-only afterwards.

pub mod catalog;
pub mod types;

pub use catalog::{build_tool_definitions, ToolCatalog};
pub use types::ToolDefinition;
