//! Tool generation from a normalized OpenAPI contract.
//!
//! Each operation becomes one [`ToolDefinition`]. The contract is expected to
//! have gone through [`crate::schema::normalize_document`] first, so schemas
//! copied into tools carry no references.

use crate::schema::{OperationRef, SchemaDocument};
use crate::tools::types::ToolDefinition;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

/// Maximum description length before truncation
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Property name that carries the JSON request body
const BODY_PROPERTY: &str = "body";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Tools built from a contract, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    by_name: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn from_document(document: &SchemaDocument) -> Self {
        let tools = build_tool_definitions(document);
        let by_name = tools
            .iter()
            .enumerate()
            .map(|(idx, tool)| (tool.name.clone(), idx))
            .collect();
        Self { tools, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.by_name.get(name).map(|&idx| &self.tools[idx])
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Transform every operation of `document` into a tool, in document order.
///
/// Operations that are not JSON objects are logged and skipped. Names are
/// made unique by suffixing `_2`, `_3`, ... to later duplicates, skipping any
/// suffixed name already taken by an earlier tool.
pub fn build_tool_definitions(document: &SchemaDocument) -> Vec<ToolDefinition> {
    let mut results = Vec::new();
    let mut issued: HashSet<String> = HashSet::new();

    for op in document.operations() {
        let Some(operation) = op.operation.as_object() else {
            tracing::warn!(
                path = op.path,
                method = op.method,
                "Skipping malformed operation definition"
            );
            continue;
        };

        let base_name = operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_tool_name(op.method, op.path));

        let name = unique_name(base_name, &mut issued);

        results.push(ToolDefinition {
            name,
            description: build_description(operation),
            method: op.method.to_uppercase(),
            path: op.path.to_string(),
            input_schema: build_input_schema(&op, operation),
            output_schema: find_output_schema(operation),
        });
    }

    tracing::debug!(
        tools = results.len(),
        title = document.title().unwrap_or("untitled"),
        "Tool generation complete"
    );

    results
}

/// Claim `base` or the first free `base_N` (N >= 2) in `issued`.
fn unique_name(base: String, issued: &mut HashSet<String>) -> String {
    if issued.insert(base.clone()) {
        return base;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if issued.insert(candidate.clone()) {
            tracing::warn!(name = %base, issued = %candidate, "Duplicate tool name, adding suffix");
            return candidate;
        }
        suffix += 1;
    }
}

/// Derive a tool name from method and path: `get /orders/{id}` -> `get_orders_id`.
fn derive_tool_name(method: &str, path: &str) -> String {
    let raw = format!("{}_{}", method, path);
    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_matches('_').to_string()
}

/// Summary and description joined by a blank line, truncated.
fn build_description(operation: &Map<String, Value>) -> String {
    let parts: Vec<&str> = ["summary", "description"]
        .iter()
        .filter_map(|key| operation.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    truncate_description(&parts.join("\n\n"))
}

/// Truncate description to MAX_DESCRIPTION_LENGTH characters with ellipsis.
///
/// Attempts to truncate at a word boundary when possible.
fn truncate_description(desc: &str) -> String {
    if desc.chars().count() <= MAX_DESCRIPTION_LENGTH {
        return desc.to_string();
    }

    let truncated: String = desc.chars().take(MAX_DESCRIPTION_LENGTH).collect();

    // Try to truncate at a word boundary
    match truncated.rfind(' ') {
        Some(pos) if truncated[..pos].chars().count() > MAX_DESCRIPTION_LENGTH - 50 => {
            format!("{}...", &truncated[..pos])
        }
        _ => format!("{}...", truncated),
    }
}

/// Build the argument schema from parameters and the JSON request body.
///
/// Path-level parameters come first; an operation-level parameter with the
/// same name replaces it.
fn build_input_schema(op: &OperationRef<'_>, operation: &Map<String, Value>) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    let parameters = parameter_list(op.path_item)
        .chain(parameter_list(operation))
        .filter_map(Value::as_object);

    for param in parameters {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            tracing::debug!(path = op.path, "Skipping parameter without a name");
            continue;
        };

        let mut schema = param
            .get("schema")
            .cloned()
            .unwrap_or_else(|| json!({ "type": "string" }));
        if let (Some(desc), Some(obj)) = (param.get("description"), schema.as_object_mut()) {
            obj.entry("description").or_insert_with(|| desc.clone());
        }

        let is_required = param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
            || param.get("in").and_then(Value::as_str) == Some("path");

        properties.insert(name.to_string(), schema);
        required.retain(|existing| existing != name);
        if is_required {
            required.push(name.to_string());
        }
    }

    if let Some(body) = operation.get("requestBody").and_then(Value::as_object) {
        if let Some(schema) = media_schema(body) {
            properties.insert(BODY_PROPERTY.to_string(), schema.clone());
            if body.get("required").and_then(Value::as_bool).unwrap_or(false) {
                required.retain(|existing| existing != BODY_PROPERTY);
                required.push(BODY_PROPERTY.to_string());
            }
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn parameter_list(holder: &Map<String, Value>) -> impl Iterator<Item = &Value> {
    holder
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Schema of the JSON media type, or of the first media type that has one.
fn media_schema(holder: &Map<String, Value>) -> Option<&Value> {
    let content = holder.get("content")?.as_object()?;
    content
        .get(JSON_MEDIA_TYPE)
        .and_then(|media| media.get("schema"))
        .or_else(|| content.values().find_map(|media| media.get("schema")))
}

/// Schema of the first 2xx response, in document order.
fn find_output_schema(operation: &Map<String, Value>) -> Option<Value> {
    operation
        .get("responses")?
        .as_object()?
        .iter()
        .filter(|(status, _)| status.starts_with('2'))
        .find_map(|(_, response)| response.as_object().and_then(media_schema))
        .cloned()
}
