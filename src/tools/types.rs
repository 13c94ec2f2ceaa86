//! Type definitions for the tools module.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable tool derived from one operation of the normalized contract.
///
/// `input_schema` is a JSON Schema object describing the arguments an agent
/// passes: one property per parameter plus `body` for a JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool identifier (operationId, or derived from method and path)
    pub name: String,

    pub description: String,

    /// Upper-case HTTP method, e.g. "GET"
    pub method: String,

    /// Path template as written in the contract, e.g. "/orders/{id}"
    pub path: String,

    #[serde(rename = "inputSchema")]
    pub input_schema: Value,

    /// JSON schema of the first successful response, when the contract has one
    #[serde(rename = "outputSchema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}
