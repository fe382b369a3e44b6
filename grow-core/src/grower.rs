//! The space-colonization growth engine.
//!
//! One growth iteration is two passes over the simulation state:
//! 1. [`attraction_phase`] — every alive attractor looks up its nearest
//!    tree node; attractors at or inside the kill distance are consumed,
//!    the rest within the influence distance accumulate a unit pull on
//!    that node in an [`InfluenceBuffer`].
//! 2. [`growth_phase`] — every influenced node sprouts one child in the
//!    averaged pull direction.
//!
//! [`grow`] wraps the two phases in a fixed-count loop with eager
//! configuration validation, so a malformed setup never touches the
//! tree.

use crate::{
    attractor::AttractorSet,
    config::{ConfigError, GrowthConfig},
    influence_buffer::InfluenceBuffer,
    nearest::NearestNodeQuery,
    tree::Tree,
    types::NodeId,
};

/// Counters describing what one [`grow`] run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Iterations actually executed (always the requested count).
    pub iterations: usize,
    /// Nodes appended to the tree over the whole run.
    pub nodes_added: usize,
    /// Attractors consumed over the whole run.
    pub points_killed: usize,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GrowError {
    #[error("invalid growth configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot grow an empty tree (no root node)")]
    EmptyTree,
}

/// Classifies every alive attractor against its nearest tree node.
///
/// For each alive attractor, with `d` the distance to the nearest node:
/// - `d <= kill_distance` — the attractor is consumed (`alive = false`)
///   and never participates again;
/// - otherwise, if `d <= influence_distance`, the unit vector from the
///   node toward the attractor is accumulated into `acc` for that node;
/// - otherwise the attractor idles this iteration.
///
/// The buffer is resized and cleared to `tree.len()` at the start, so
/// influence never leaks between iterations. Distances are compared in
/// squared form; the thresholds are non-negative so the comparisons are
/// equivalent.
///
/// ### Returns
/// The number of attractors consumed in this pass.
pub fn attraction_phase(
    tree: &Tree,
    attractors: &mut AttractorSet,
    cfg: &GrowthConfig,
    query: &impl NearestNodeQuery,
    acc: &mut InfluenceBuffer,
) -> usize {
    let kill_d2 = cfg.kill_distance * cfg.kill_distance;
    let influence_d2 = cfg.influence_distance * cfg.influence_distance;

    acc.ensure_len(tree.len());

    let mut killed = 0;
    for a in attractors.points.iter_mut().filter(|a| a.alive) {
        let Some((id, d2)) = query.nearest(tree, a.pos) else {
            continue;
        };
        if d2 <= kill_d2 {
            a.alive = false;
            killed += 1;
        } else if d2 <= influence_d2 {
            // Unit direction from node to attractor; a zero-length
            // offset contributes the zero vector instead of NaN.
            let dir = (a.pos - tree.nodes[id].pos).normalize_or_zero();
            acc.add(id, dir);
        }
    }
    killed
}

/// Grows one child under every influenced node.
///
/// The new position is `node.pos + avg_dir * growth_step`, where
/// `avg_dir` is the unweighted mean of the accumulated unit vectors.
/// The mean is deliberately not renormalized: symmetric attractors
/// cancel out and produce a child at the parent's own position, a
/// degenerate but well-defined outcome.
///
/// Nodes are visited in ascending id order, which is stable across runs
/// and fixes both child insertion order and id assignment.
///
/// ### Returns
/// Ids of the nodes created this pass, in creation order.
pub fn growth_phase(tree: &mut Tree, acc: &InfluenceBuffer, cfg: &GrowthConfig) -> Vec<NodeId> {
    let mut to_add = Vec::with_capacity(16);
    for id in acc.influenced_indices() {
        let dir = acc.avg_dir(id);
        to_add.push((id, tree.nodes[id].pos + dir * cfg.growth_step));
    }

    let mut new_ids = Vec::with_capacity(to_add.len());
    for (parent, pos) in to_add {
        new_ids.push(tree.add_child(parent, pos));
    }
    new_ids
}

/// Runs the full growth loop for exactly `iterations` iterations.
///
/// Validates the configuration and the non-empty-tree precondition
/// before touching anything. Iterations where no attractor influences
/// any node are valid no-ops; the loop always runs to completion even
/// after every attractor has been consumed.
///
/// Given the same attractor sequence, configuration and iteration
/// count, two runs produce structurally identical trees: iteration
/// order is insertion order everywhere, so even floating-point
/// summation order is fixed.
///
/// ### Parameters
/// - `tree` - Tree to grow in place; must contain at least the root.
/// - `attractors` - Working point set; consumed points are marked dead.
/// - `cfg` - Growth constants, validated eagerly.
/// - `iterations` - Exact number of passes to run.
/// - `query` - Nearest-node lookup strategy (see [`crate::nearest`]).
///
/// ### Returns
/// A [`GrowthReport`] with run totals, or a [`GrowError`] if the
/// configuration is malformed or the tree has no root.
pub fn grow(
    tree: &mut Tree,
    attractors: &mut AttractorSet,
    cfg: &GrowthConfig,
    iterations: usize,
    query: &impl NearestNodeQuery,
) -> Result<GrowthReport, GrowError> {
    cfg.validate()?;
    if tree.is_empty() {
        return Err(GrowError::EmptyTree);
    }

    let mut acc = InfluenceBuffer::with_len(tree.len());
    let mut report = GrowthReport::default();

    for iteration in 0..iterations {
        let killed = attraction_phase(tree, attractors, cfg, query, &mut acc);
        let new_ids = growth_phase(tree, &acc, cfg);

        tracing::debug!(
            iteration,
            killed,
            added = new_ids.len(),
            nodes = tree.len(),
            alive = attractors.alive_count(),
            "growth iteration"
        );

        report.iterations += 1;
        report.nodes_added += new_ids.len();
        report.points_killed += killed;
    }

    Ok(report)
}
