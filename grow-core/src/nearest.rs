//! Nearest-node lookup behind a small trait seam.
//!
//! The grower only talks to [`NearestNodeQuery`], so the exhaustive
//! [`FullScan`] below could later be swapped for a spatial index (grid,
//! k-d tree) without touching the growth loop.

use crate::tree::Tree;
use crate::types::NodeId;
use glam::Vec3;

/// Finds the tree node closest to a query position.
pub trait NearestNodeQuery {
    /// Returns the id of the nearest node and the *squared* distance to
    /// it, or `None` for an empty tree.
    fn nearest(&self, tree: &Tree, pos: Vec3) -> Option<(NodeId, f32)>;
}

/// Exhaustive recursive scan of the whole tree.
///
/// Cost is linear in the tree size per query. Ties are broken toward
/// the node encountered first in child iteration order (a node beats
/// its descendants, an earlier child subtree beats a later one), which
/// keeps results stable across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullScan;

impl NearestNodeQuery for FullScan {
    fn nearest(&self, tree: &Tree, pos: Vec3) -> Option<(NodeId, f32)> {
        if tree.is_empty() {
            return None;
        }
        Some(scan(tree, tree.root(), pos))
    }
}

fn scan(tree: &Tree, id: NodeId, pos: Vec3) -> (NodeId, f32) {
    let mut best = id;
    let mut best_d2 = (tree.nodes[id].pos - pos).length_squared();
    for &child in &tree.nodes[id].children {
        let (sub_best, sub_d2) = scan(tree, child, pos);
        // Strict comparison: on a tie the earlier node wins.
        if sub_d2 < best_d2 {
            best = sub_best;
            best_d2 = sub_d2;
        }
    }
    (best, best_d2)
}
