//! Depth-first traversal over untyped JSON documents.
//!
//! Every pipeline in the crate walks `serde_json::Value` trees. Read-only passes
//! go through [`walk`], rebuilding passes through [`map_children`], and in-place
//! edits locate their target with [`node_at_mut`] so that only one mutable
//! borrow of any node exists at a time.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io;

/// One step from a container node to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Key inside a mapping.
    Key(String),
    /// Position inside a sequence.
    Index(usize),
}

/// Location of a node relative to the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path one level below `self`.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }

    /// Splits the path into the owning container's segments and the final step.
    pub fn split_last(&self) -> Option<(&Segment, &[Segment])> {
        self.0.split_last()
    }
}

impl From<Vec<Segment>> for NodePath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

/// Renders the path as a JSON pointer (RFC 6901), e.g. `/items/0/body`.
impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?,
                Segment::Index(idx) => write!(f, "/{}", idx)?,
            }
        }
        Ok(())
    }
}

/// Whether [`walk`] should enter the children of the node just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Into,
    Skip,
}

/// Visit every node of `root` depth-first, pre-order, in insertion order.
///
/// The visitor receives the node's path and the node itself. Returning
/// [`Descend::Skip`] prunes the subtree below a container.
pub fn walk<F>(root: &Value, mut visit: F)
where
    F: FnMut(&NodePath, &Value) -> Descend,
{
    let mut path = NodePath::root();
    walk_node(root, &mut path, &mut visit);
}

fn walk_node<F>(node: &Value, path: &mut NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &Value) -> Descend,
{
    if visit(path, node) == Descend::Skip {
        return;
    }

    match node {
        Value::Object(map) => {
            for (key, child) in map {
                path.0.push(Segment::Key(key.clone()));
                walk_node(child, path, visit);
                path.0.pop();
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                path.0.push(Segment::Index(idx));
                walk_node(child, path, visit);
                path.0.pop();
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Follow `segments` from `root` and return the node there, if the shape matches.
pub fn node_at_mut<'a>(root: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| match (segment, node) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key),
            (Segment::Index(idx), Value::Array(items)) => items.get_mut(*idx),
            _ => None,
        })
}

/// Rebuild a container by applying `f` to each direct child.
///
/// Mapping key order is kept. Scalars are cloned as-is.
pub fn map_children<F>(node: &Value, mut f: F) -> Value
where
    F: FnMut(&Value) -> Value,
{
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), f(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(f).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => node.clone(),
    }
}

/// Character count of the compact JSON serialization of `value`.
pub fn serialized_len<T>(value: &T) -> usize
where
    T: Serialize + ?Sized,
{
    let mut counter = CharCounter::default();
    // Writing into the counter cannot fail.
    let _ = serde_json::to_writer(&mut counter, value);
    counter.chars
}

/// `io::Write` sink that counts UTF-8 scalar values instead of storing bytes.
#[derive(Default)]
struct CharCounter {
    chars: usize,
}

impl io::Write for CharCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // serde_json only emits complete UTF-8 sequences, so counting
        // non-continuation bytes counts characters.
        self.chars += buf.iter().filter(|&&b| (b & 0xC0) != 0x80).count();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walk_visits_in_insertion_order() {
        let doc = json!({ "z": 1, "a": [true, { "m": null }], "b": "s" });
        let mut seen = Vec::new();
        walk(&doc, |path, _| {
            seen.push(path.to_string());
            Descend::Into
        });

        assert_eq!(seen, vec!["", "/z", "/a", "/a/0", "/a/1", "/a/1/m", "/b"]);
    }

    #[test]
    fn test_walk_skip_prunes_subtree() {
        let doc = json!({ "keep": { "x": 1 }, "skip": { "y": 2 } });
        let mut seen = Vec::new();
        walk(&doc, |path, _| {
            seen.push(path.to_string());
            if path.to_string() == "/skip" {
                Descend::Skip
            } else {
                Descend::Into
            }
        });

        assert!(seen.contains(&"/keep/x".to_string()));
        assert!(seen.contains(&"/skip".to_string()));
        assert!(!seen.contains(&"/skip/y".to_string()));
    }

    #[test]
    fn test_node_at_mut_follows_keys_and_indices() {
        let mut doc = json!({ "items": [{ "name": "a" }, { "name": "b" }] });
        let path = vec![
            Segment::Key("items".into()),
            Segment::Index(1),
            Segment::Key("name".into()),
        ];

        *node_at_mut(&mut doc, &path).unwrap() = json!("changed");

        assert_eq!(doc["items"][1]["name"], "changed");
        assert_eq!(doc["items"][0]["name"], "a");
    }

    #[test]
    fn test_node_at_mut_shape_mismatch_returns_none() {
        let mut doc = json!({ "items": { "0": 1 } });
        let path = vec![Segment::Key("items".into()), Segment::Index(0)];
        assert!(node_at_mut(&mut doc, &path).is_none());
    }

    #[test]
    fn test_map_children_keeps_key_order() {
        let doc = json!({ "b": 1, "a": 2, "c": 3 });
        let doubled = map_children(&doc, |v| json!(v.as_i64().unwrap() * 2));

        let keys: Vec<&String> = doubled.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(doubled["a"], 4);
    }

    #[test]
    fn test_serialized_len_counts_characters() {
        let doc = json!({ "k": "héllo" });
        let serialized = serde_json::to_string(&doc).unwrap();
        assert_eq!(serialized_len(&doc), serialized.chars().count());
        assert!(serialized_len(&doc) < serialized.len());
        assert_eq!(serialized_len("a\"b"), 6);
    }

    #[test]
    fn test_path_display_escapes_pointer_tokens() {
        let path = NodePath::root()
            .child(Segment::Key("a/b".into()))
            .child(Segment::Key("c~d".into()));
        assert_eq!(path.to_string(), "/a~1b/c~0d");
    }
}
