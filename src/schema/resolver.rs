//! Inlines `#/components/schemas/...` references with cycle detection.
//!
//! Every reference occurrence is expanded on its own: the set of names being
//! expanded is a chain of stack frames ([`Visited`]) owned by the current
//! branch, so a cycle cut on one branch never affects a sibling that reaches
//! the same schema.

use crate::document::map_children;
use crate::schema::types::{for_each_media_type_mut, SchemaDocument, SCHEMA_REF_PREFIX};
use serde_json::{json, Map, Value};

/// Schema names under expansion on the current branch, innermost first.
#[derive(Debug, Clone, Copy)]
pub enum Visited<'a> {
    Root,
    Expanding {
        name: &'a str,
        parent: &'a Visited<'a>,
    },
}

impl<'a> Visited<'a> {
    pub fn contains(&self, name: &str) -> bool {
        let mut frame = self;
        loop {
            match frame {
                Visited::Root => return false,
                Visited::Expanding { name: current, parent } => {
                    if *current == name {
                        return true;
                    }
                    frame = *parent;
                }
            }
        }
    }

    /// A frame one level deeper, visible only to calls made with it.
    pub fn with<'b>(&'b self, name: &'b str) -> Visited<'b> {
        Visited::Expanding { name, parent: self }
    }

    pub fn depth(&self) -> usize {
        match self {
            Visited::Root => 0,
            Visited::Expanding { parent, .. } => 1 + parent.depth(),
        }
    }
}

/// Counters from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub inlined: usize,
    pub cycles: usize,
    pub unresolved: usize,
}

/// Resolves references against a fixed snapshot of `components.schemas`.
pub struct RefResolver {
    components: Map<String, Value>,
}

impl RefResolver {
    pub fn new(components: Map<String, Value>) -> Self {
        Self { components }
    }

    /// Snapshot the component table of `document`.
    pub fn for_document(document: &SchemaDocument) -> Self {
        Self::new(document.component_schemas().cloned().unwrap_or_default())
    }

    /// Return `schema` with every resolvable reference inlined.
    pub fn inline_all_refs(&self, schema: &Value) -> Value {
        let mut stats = ResolveStats::default();
        self.inline(schema, &Visited::Root, &mut stats)
    }

    pub fn inline_with_stats(&self, schema: &Value, stats: &mut ResolveStats) -> Value {
        self.inline(schema, &Visited::Root, stats)
    }

    fn inline(&self, node: &Value, visited: &Visited<'_>, stats: &mut ResolveStats) -> Value {
        match node {
            Value::Object(map) => {
                let Some(reference) = map.get("$ref") else {
                    return map_children(node, |child| self.inline(child, visited, stats));
                };
                let Some(name) = reference.as_str().and_then(schema_ref_name) else {
                    // Not a components/schemas pointer; left for the consumer.
                    return node.clone();
                };

                if visited.contains(&name) {
                    stats.cycles += 1;
                    tracing::debug!(schema = %name, depth = visited.depth(), "Circular reference cut");
                    return cycle_placeholder(&name);
                }

                match self.components.get(&name).filter(|body| !is_blank(body)) {
                    Some(body) => {
                        stats.inlined += 1;
                        self.inline(body, &visited.with(&name), stats)
                    }
                    None => {
                        stats.unresolved += 1;
                        tracing::debug!(schema = %name, "Reference to unknown schema left in place");
                        node.clone()
                    }
                }
            }
            Value::Array(_) => map_children(node, |child| self.inline(child, visited, stats)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => node.clone(),
        }
    }
}

/// A component body with nothing to inline: `null`, `false`, zero, or an
/// empty string, sequence or mapping. References to it stay in place.
fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Extract the schema name from `#/components/schemas/<name>`.
///
/// The last pointer token is used, with `~1` and `~0` unescaped.
pub fn schema_ref_name(reference: &str) -> Option<String> {
    let rest = reference.strip_prefix(SCHEMA_REF_PREFIX)?;
    let token = rest.rsplit('/').next()?;
    Some(token.replace("~1", "/").replace("~0", "~"))
}

/// Stub substituted for a reference that would recurse forever.
pub fn cycle_placeholder(name: &str) -> Value {
    json!({
        "type": "object",
        "description": format!("Circular reference to {}", name),
    })
}

/// Inline references throughout `document`.
///
/// Covers request bodies, responses and parameters of every operation,
/// path-level parameters, and every entry of `components.schemas`. All
/// lookups go against the component table as it was before the pass.
pub fn resolve_document(document: &mut SchemaDocument) -> ResolveStats {
    let resolver = RefResolver::for_document(document);
    let mut stats = ResolveStats::default();

    if let Some(paths) = document.paths_mut() {
        for item in paths.values_mut() {
            let Some(item) = item.as_object_mut() else {
                continue;
            };
            resolve_parameters(&resolver, item, &mut stats);
        }
    }

    document.for_each_operation_mut(|_, _, operation| {
        if let Some(body) = operation
            .get_mut("requestBody")
            .and_then(Value::as_object_mut)
        {
            resolve_media_schemas(&resolver, body, &mut stats);
        }

        if let Some(responses) = operation.get_mut("responses").and_then(Value::as_object_mut) {
            for response in responses.values_mut() {
                if let Some(response) = response.as_object_mut() {
                    resolve_media_schemas(&resolver, response, &mut stats);
                }
            }
        }

        resolve_parameters(&resolver, operation, &mut stats);
    });

    if let Some(schemas) = document.component_schemas_mut() {
        for schema in schemas.values_mut() {
            *schema = resolver.inline_with_stats(schema, &mut stats);
        }
    }

    tracing::info!(
        inlined = stats.inlined,
        cycles = stats.cycles,
        unresolved = stats.unresolved,
        "Schema references resolved"
    );

    stats
}

fn resolve_media_schemas(
    resolver: &RefResolver,
    holder: &mut Map<String, Value>,
    stats: &mut ResolveStats,
) {
    for_each_media_type_mut(holder, |media| {
        if let Some(schema) = media.get_mut("schema") {
            *schema = resolver.inline_with_stats(schema, stats);
        }
    });
}

fn resolve_parameters(
    resolver: &RefResolver,
    holder: &mut Map<String, Value>,
    stats: &mut ResolveStats,
) {
    let Some(parameters) = holder.get_mut("parameters").and_then(Value::as_array_mut) else {
        return;
    };
    for parameter in parameters.iter_mut() {
        if let Some(schema) = parameter.get_mut("schema") {
            *schema = resolver.inline_with_stats(schema, stats);
        }
    }
}
