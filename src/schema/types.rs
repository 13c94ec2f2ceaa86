//! The OpenAPI contract held by the service.

use crate::error::{AppError, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Operation keys of an OpenAPI path item.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "patch", "delete", "options", "head", "trace",
];

/// Prefix of every reference the resolver can inline.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// An OpenAPI v3 document: `paths` plus `components.schemas`.
///
/// Parsed once at startup and normalized in place before it is shared.
/// Only the top-level shape is checked; everything below `paths` is read
/// leniently.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    root: Value,
}

/// Read-only view of one operation inside a [`SchemaDocument`].
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub operation: &'a Value,
    /// The enclosing path item, for path-level `parameters`.
    pub path_item: &'a Map<String, Value>,
}

impl SchemaDocument {
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(AppError::SchemaError(
                "OpenAPI document must be a JSON object".to_string(),
            ));
        }
        if let Some(paths) = root.get("paths") {
            if !paths.is_object() {
                return Err(AppError::SchemaError(
                    "'paths' must be a JSON object".to_string(),
                ));
            }
        }
        Ok(Self { root })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Read and parse the contract at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::SchemaError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let document = Self::from_json_str(&raw).map_err(|e| match e {
            AppError::SchemaError(msg) => {
                AppError::SchemaError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            operations = document.operations().count(),
            schemas = document.component_schemas().map_or(0, |s| s.len()),
            "OpenAPI contract loaded"
        );
        Ok(document)
    }

    /// A contract with no operations, served when none could be loaded.
    pub fn empty() -> Self {
        Self {
            root: json!({
                "openapi": "3.0.0",
                "info": { "title": "unavailable", "version": "0" },
                "paths": {}
            }),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn title(&self) -> Option<&str> {
        self.root
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
    }

    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root.get("paths").and_then(Value::as_object)
    }

    pub(crate) fn paths_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root.get_mut("paths").and_then(Value::as_object_mut)
    }

    pub fn component_schemas(&self) -> Option<&Map<String, Value>> {
        self.root
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object)
    }

    pub(crate) fn component_schemas_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root
            .get_mut("components")
            .and_then(|c| c.get_mut("schemas"))
            .and_then(Value::as_object_mut)
    }

    /// Every operation in document order, across all HTTP methods.
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.paths()
            .into_iter()
            .flat_map(|paths| paths.iter())
            .filter_map(|(path, item)| item.as_object().map(|item| (path, item)))
            .flat_map(|(path, item)| {
                item.iter()
                    .filter(|(method, _)| is_http_method(method))
                    .map(move |(method, operation)| OperationRef {
                        path: path.as_str(),
                        method: method.as_str(),
                        operation,
                        path_item: item,
                    })
            })
    }

    /// Apply `f` to every operation object, in document order.
    pub(crate) fn for_each_operation_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &str, &mut Map<String, Value>),
    {
        let Some(paths) = self.paths_mut() else {
            return;
        };
        for (path, item) in paths.iter_mut() {
            let Some(item) = item.as_object_mut() else {
                continue;
            };
            for (method, operation) in item.iter_mut() {
                if !is_http_method(method) {
                    continue;
                }
                if let Some(operation) = operation.as_object_mut() {
                    f(path, method, operation);
                }
            }
        }
    }
}

/// Apply `f` to the `schema` of every media-type entry under `content`.
pub(crate) fn for_each_media_type_mut<F>(holder: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    let Some(content) = holder.get_mut("content").and_then(Value::as_object_mut) else {
        return;
    };
    for media in content.values_mut() {
        if let Some(media) = media.as_object_mut() {
            f(media);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn petstore() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets", "version": "1" },
            "paths": {
                "/pets": {
                    "summary": "not an operation",
                    "parameters": [],
                    "get": { "operationId": "listPets" },
                    "post": { "operationId": "createPet" }
                },
                "/pets/{id}": {
                    "delete": { "operationId": "deletePet" }
                }
            },
            "components": { "schemas": { "Pet": { "type": "object" } } }
        })
    }

    #[test]
    fn test_operations_skip_non_method_keys() {
        let doc = SchemaDocument::from_value(petstore()).unwrap();
        let ops: Vec<(&str, &str)> = doc.operations().map(|op| (op.path, op.method)).collect();

        assert_eq!(
            ops,
            vec![
                ("/pets", "get"),
                ("/pets", "post"),
                ("/pets/{id}", "delete")
            ]
        );
    }

    #[test]
    fn test_rejects_non_object_documents() {
        assert!(SchemaDocument::from_value(json!([1, 2])).is_err());
        assert!(SchemaDocument::from_value(json!({ "paths": [] })).is_err());
        assert!(SchemaDocument::from_json_str("{ nope").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", petstore()).unwrap();

        let doc = SchemaDocument::load(file.path()).unwrap();
        assert_eq!(doc.title(), Some("Pets"));
        assert_eq!(doc.component_schemas().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_schema_error() {
        let err = SchemaDocument::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AppError::SchemaError(_)));
    }

    #[test]
    fn test_empty_document_has_no_operations() {
        let doc = SchemaDocument::empty();
        assert_eq!(doc.operations().count(), 0);
        assert!(doc.component_schemas().is_none());
    }
}
