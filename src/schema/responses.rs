//! Drops array-typed response schemas that tool generation cannot represent.

use crate::schema::types::{for_each_media_type_mut, SchemaDocument};
use serde_json::Value;

/// Remove the `schema` of every response media type whose type is `"array"`.
///
/// Runs after reference resolution, so `$ref`s to array schemas are caught too.
/// The rest of the response (description, headers, examples) is left as is.
/// Returns the number of schemas removed.
pub fn strip_array_responses(document: &mut SchemaDocument) -> usize {
    let mut stripped = 0;

    document.for_each_operation_mut(|path, method, operation| {
        let Some(responses) = operation.get_mut("responses").and_then(Value::as_object_mut) else {
            return;
        };
        for (status, response) in responses.iter_mut() {
            let Some(response) = response.as_object_mut() else {
                continue;
            };
            for_each_media_type_mut(response, |media| {
                if is_array_schema(media.get("schema")) {
                    media.shift_remove("schema");
                    stripped += 1;
                    tracing::debug!(path, method, status = %status, "Dropped array response schema");
                }
            });
        }
    });

    if stripped > 0 {
        tracing::info!(stripped, "Array response schemas removed");
    }

    stripped
}

fn is_array_schema(schema: Option<&Value>) -> bool {
    schema
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str)
        == Some("array")
}
