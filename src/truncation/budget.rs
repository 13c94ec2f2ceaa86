//! Budget-constrained truncation of JSON payloads.
//!
//! A payload over budget is shrunk field by field, largest oversized string
//! first, each cut only as far as needed and never below
//! [`INDIVIDUAL_MIN_LENGTH`] characters in one pass. When every candidate is
//! spent and the document still does not fit, or the payload is not JSON at
//! all, the whole payload is cut to the budget instead.
//!
//! Lengths are counted in characters of the compact JSON serialization.

use crate::document::{node_at_mut, serialized_len};
use crate::truncation::collector::{collect_long_strings, FieldRef};
use serde::Serialize;
use serde_json::Value;

/// Floor below which a single field is never shrunk in one pass.
pub const INDIVIDUAL_MIN_LENGTH: usize = 100;

/// Appended to the raw payload when the whole-document fallback is used.
pub const FALLBACK_MARKER: &str = "\n... [TRUNCATED]";

/// Which path produced a [`Truncated`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationOutcome {
    /// Already within budget; returned byte-for-byte.
    Unchanged,
    /// Reserialized document with oversized fields shortened.
    Fields,
    /// Raw payload cut to the budget; no structural guarantee.
    Fallback,
}

impl TruncationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Fields => "fields",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of [`truncate_by_length`]. `content` is never longer than the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub content: String,
    pub outcome: TruncationOutcome,
    /// Fields rewritten on the way, including attempts discarded by the fallback.
    pub fields_truncated: usize,
    pub original_length: usize,
}

impl Truncated {
    /// Length of `content` in characters.
    pub fn length(&self) -> usize {
        self.content.chars().count()
    }
}

/// Bookkeeping from one [`shrink_fields`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkReport {
    /// Serialized length as tracked by the loop.
    pub tracked_length: usize,
    pub fields_truncated: usize,
    pub candidates_left: usize,
}

impl ShrinkReport {
    pub fn fits(&self, max_length: usize) -> bool {
        self.tracked_length <= max_length
    }
}

/// Shrink `content` so that it is at most `max_length` characters.
///
/// Strings longer than `threshold` held as mapping values are the candidates
/// for field-level shrinking. Never fails: anything the field pass cannot
/// handle goes through [`hard_truncate`].
pub fn truncate_by_length(content: &str, max_length: usize, threshold: usize) -> Truncated {
    let original_length = content.chars().count();
    if original_length <= max_length {
        return Truncated {
            content: content.to_string(),
            outcome: TruncationOutcome::Unchanged,
            fields_truncated: 0,
            original_length,
        };
    }

    let mut fields_truncated = 0;
    match serde_json::from_str::<Value>(content) {
        Ok(mut data) => {
            let fields = collect_long_strings(&data, threshold);
            let report = shrink_fields(&mut data, fields, max_length);
            fields_truncated = report.fields_truncated;

            if report.fits(max_length) {
                // Tracking is per field; measure the whole document once more.
                let serialized = data.to_string();
                let length = serialized.chars().count();
                if length <= max_length {
                    tracing::debug!(
                        original_length,
                        length,
                        fields_truncated,
                        "Payload fitted by field truncation"
                    );
                    return Truncated {
                        content: serialized,
                        outcome: TruncationOutcome::Fields,
                        fields_truncated,
                        original_length,
                    };
                }
                tracing::debug!(
                    length,
                    max_length,
                    "Reserialized payload still over budget"
                );
            } else {
                tracing::debug!(
                    tracked_length = report.tracked_length,
                    max_length,
                    fields_truncated,
                    "Oversized fields exhausted before reaching budget"
                );
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Payload is not a JSON document");
        }
    }

    Truncated {
        content: hard_truncate(content, max_length),
        outcome: TruncationOutcome::Fallback,
        fields_truncated,
        original_length,
    }
}

/// Greedy field pass over `root`, largest candidate first.
///
/// Each iteration consumes exactly one candidate, so the loop runs at most
/// `fields.len()` times. A candidate keeps
/// `max(INDIVIDUAL_MIN_LENGTH, length - excess - marker)` characters followed
/// by a marker naming the number removed, and the tracked length drops by the
/// change in the field's serialized size. Candidates may be in any order.
pub fn shrink_fields(root: &mut Value, mut fields: Vec<FieldRef>, max_length: usize) -> ShrinkReport {
    fields.sort_by_key(|field| field.length);

    let mut current = serialized_len(&*root);
    let mut fields_truncated = 0;

    while current > max_length {
        let Some(field) = fields.pop() else {
            break;
        };

        let excess = current - max_length;
        // Room for the marker, sized for the largest count this field could report.
        let marker_room = truncation_marker(field.length).chars().count();
        let new_length =
            INDIVIDUAL_MIN_LENGTH.max(field.length.saturating_sub(excess + marker_room));
        let removed = field.length.saturating_sub(new_length);
        let marker = truncation_marker(removed);
        if new_length + marker.chars().count() >= field.length {
            // At or near the floor: cutting would not make the field shorter.
            continue;
        }

        let Some(Value::String(text)) = node_at_mut(root, field.owner.segments())
            .and_then(|owner| owner.get_mut(field.key.as_str()))
        else {
            tracing::warn!(path = %field.path(), "Collected field no longer addresses a string");
            continue;
        };

        let before = serialized_len(text.as_str());
        let mut shortened: String = text.chars().take(new_length).collect();
        shortened.push_str(&marker);
        *text = shortened;
        let after = serialized_len(text.as_str());

        current = current.saturating_sub(before.saturating_sub(after));
        fields_truncated += 1;
    }

    ShrinkReport {
        tracked_length: current,
        fields_truncated,
        candidates_left: fields.len(),
    }
}

fn truncation_marker(removed: usize) -> String {
    format!("... [TRUNCATED: {} chars removed]", removed)
}

/// Cut `content` to at most `max_length` characters, ending in [`FALLBACK_MARKER`].
///
/// When the budget is smaller than the marker itself, the plain prefix is returned.
pub fn hard_truncate(content: &str, max_length: usize) -> String {
    if content.chars().count() <= max_length {
        return content.to_string();
    }

    let marker_length = FALLBACK_MARKER.chars().count();
    if max_length <= marker_length {
        return content.chars().take(max_length).collect();
    }

    let mut truncated: String = content.chars().take(max_length - marker_length).collect();
    truncated.push_str(FALLBACK_MARKER);
    truncated
}
