/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is an index into `Tree::nodes`, and is only meaningful within
/// the lifetime of a given `Tree` instance. Ids are handed out in
/// creation order and never reused, so they double as a stable identity
/// key (two nodes at the same position are still distinct nodes).
pub type NodeId = usize;
