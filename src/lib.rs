//! Toolfit - fits tool output into a content budget and turns an OpenAPI
//! contract into self-contained tool definitions.
//!
//! This library exposes the core components of the service, enabling
//! integration tests and embedding in other applications.

pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod schema;
pub mod state;
pub mod tools;
pub mod truncation;

// Re-export key types for convenience
pub use config::{Config, OperatingMode};
pub use error::{AppError, Result};
pub use handlers::{health_handler, ready_handler, router, truncate_handler};
pub use schema::{normalize_document, SchemaDocument};
pub use state::AppState;
pub use tools::{ToolCatalog, ToolDefinition};
pub use truncation::{truncate_by_length, Truncated, TruncationOutcome};
