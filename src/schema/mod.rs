//! Schema-normalization pipeline.
//!
//! The contract is loaded once ([`types`]), every `$ref` into
//! `components.schemas` is inlined ([`resolver`]), and array-typed response
//! schemas are dropped ([`responses`]). The result is reference-free and ready
//! for tool generation.

pub mod resolver;
pub mod responses;
pub mod types;

pub use resolver::{
    cycle_placeholder, resolve_document, schema_ref_name, RefResolver, ResolveStats, Visited,
};
pub use responses::strip_array_responses;
pub use types::{is_http_method, OperationRef, SchemaDocument, HTTP_METHODS, SCHEMA_REF_PREFIX};

/// What [`normalize_document`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub resolve: ResolveStats,
    pub array_responses_stripped: usize,
}

/// Resolve references, then strip array responses. Never fails.
pub fn normalize_document(document: &mut SchemaDocument) -> NormalizeReport {
    let resolve = resolve_document(document);
    let array_responses_stripped = strip_array_responses(document);

    metrics::counter!("schema_refs_inlined_total").increment(resolve.inlined as u64);
    metrics::counter!("schema_cycles_total").increment(resolve.cycles as u64);
    metrics::counter!("schema_array_responses_stripped_total")
        .increment(array_responses_stripped as u64);

    NormalizeReport {
        resolve,
        array_responses_stripped,
    }
}
