//! Shared traversal primitives over JSON document trees.

pub mod walk;

pub use walk::{map_children, node_at_mut, serialized_len, walk, Descend, NodePath, Segment};
