//! Locates oversized string fields inside a JSON document.

use crate::document::{walk, Descend, NodePath, Segment};
use serde_json::Value;

/// An oversized string held directly as a mapping value.
///
/// `owner` addresses the mapping that holds the string and `key` the entry
/// within it. The locator stays valid as long as no key on the way down is
/// renamed or removed between collection and use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub owner: NodePath,
    pub key: String,
    /// Length in characters at collection time.
    pub length: usize,
}

impl FieldRef {
    /// Full path to the string value itself.
    pub fn path(&self) -> NodePath {
        self.owner.child(Segment::Key(self.key.clone()))
    }
}

/// Collect every mapping-held string longer than `threshold` characters.
///
/// Sequences are searched only for nested containers: a long string that sits
/// directly in a sequence is not a candidate. Results follow document order.
pub fn collect_long_strings(root: &Value, threshold: usize) -> Vec<FieldRef> {
    let mut fields = Vec::new();

    walk(root, |path, node| {
        let Value::String(text) = node else {
            return Descend::Into;
        };
        if let Some((Segment::Key(key), owner)) = path.split_last() {
            let length = text.chars().count();
            if length > threshold {
                fields.push(FieldRef {
                    owner: NodePath::from(owner.to_vec()),
                    key: key.clone(),
                    length,
                });
            }
        }
        Descend::Into
    });

    fields
}
