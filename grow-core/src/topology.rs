//! Pipe-model thickness propagation and segment extraction.
//!
//! A finished tree is folded bottom-up into [`Segment`]s: continuous
//! polylines running from one branch point to the next branch point or
//! leaf, each carrying the thickness of the sub-branch it feeds. At a
//! branch point the child thicknesses combine by the pipe model
//! (cross-sectional areas sum), so trunks come out thicker than the
//! limbs they carry.
//!
//! Segments leave the fold through the [`GeometryEmitter`] seam; the
//! core never builds meshes itself.

use crate::tree::Tree;
use crate::types::NodeId;
use glam::Vec3;
use thiserror::Error;

/// One continuous tube destined for geometry emission.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Polyline running from the branch point outward.
    pub points: Vec<Vec3>,
    /// Tube thickness (diameter) along the polyline.
    pub thickness: f32,
    /// Trunk-only taper factor in `(0, 1]`: the near end is widened to
    /// `thickness / taper` while the far end stays at `thickness`.
    pub taper: Option<f32>,
}

/// Consumer of computed segment data.
///
/// Implementations turn polyline-plus-thickness descriptions into
/// renderable geometry (curves, extruded tubes, debug markers). The
/// builder only ever hands over finished numeric data.
pub trait GeometryEmitter {
    fn emit_segment(&mut self, segment: Segment);

    /// Flat point cloud for debug visualization (e.g. the attractor
    /// set that drove the growth).
    fn emit_points(&mut self, points: &[Vec3]);
}

/// [`GeometryEmitter`] that simply records everything it is given.
///
/// Used by tests and by hosts that post-process segments in bulk.
#[derive(Debug, Default)]
pub struct SegmentCollector {
    pub segments: Vec<Segment>,
    pub debug_points: Vec<Vec3>,
}

impl GeometryEmitter for SegmentCollector {
    fn emit_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn emit_points(&mut self, points: &[Vec3]) {
        self.debug_points.extend_from_slice(points);
    }
}

/// Constants for the thickness fold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopologyParams {
    /// Thickness assigned to every leaf tip.
    pub base_thickness: f32,
    /// Pipe-model exponent: child `thickness^exp` values sum to the
    /// parent's. `2.0` conserves cross-sectional area.
    pub thickness_exp: f32,
    /// Trunk taper factor in `(0, 1]`.
    pub trunk_taper: f32,
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            base_thickness: 0.005,
            thickness_exp: 2.0,
            trunk_taper: 0.7,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("base_thickness must be positive and finite, got {0}")]
    InvalidBaseThickness(f32),
    #[error("thickness_exp must be positive and finite, got {0}")]
    InvalidExponent(f32),
    #[error("trunk_taper must lie in (0, 1], got {0}")]
    InvalidTaper(f32),
    #[error("cannot build topology for an empty tree (no root node)")]
    EmptyTree,
}

impl TopologyParams {
    pub fn validate(&self) -> Result<(), TopologyError> {
        if !self.base_thickness.is_finite() || self.base_thickness <= 0.0 {
            return Err(TopologyError::InvalidBaseThickness(self.base_thickness));
        }
        if !self.thickness_exp.is_finite() || self.thickness_exp <= 0.0 {
            return Err(TopologyError::InvalidExponent(self.thickness_exp));
        }
        if !self.trunk_taper.is_finite() || self.trunk_taper <= 0.0 || self.trunk_taper > 1.0 {
            return Err(TopologyError::InvalidTaper(self.trunk_taper));
        }
        Ok(())
    }
}

/// Folds the whole tree into segments, emitting them through `emitter`.
///
/// Every completed branch below a branching point is emitted as its
/// own [`Segment`]; the remaining trunk chain is emitted last with the
/// taper factor applied. Returns the trunk thickness.
///
/// A root with no children yields one degenerate single-point trunk
/// segment — accepting or rejecting trivial trees is the caller's
/// decision.
pub fn build_topology(
    tree: &Tree,
    params: &TopologyParams,
    emitter: &mut impl GeometryEmitter,
) -> Result<f32, TopologyError> {
    params.validate()?;
    if tree.is_empty() {
        return Err(TopologyError::EmptyTree);
    }

    let (thickness, chain) = branch_fold(tree, tree.root(), params, emitter);
    tracing::debug!(
        trunk_thickness = thickness,
        trunk_points = chain.len(),
        "topology built"
    );
    emitter.emit_segment(Segment {
        points: chain,
        thickness,
        taper: Some(params.trunk_taper),
    });
    Ok(thickness)
}

/// Post-order fold returning `(thickness, chain)` for one subtree.
///
/// - Leaf: base thickness, chain of just its own position.
/// - One child: thickness passes through; the chain grows by this
///   node's position. No segment is emitted — unbranched runs
///   accumulate into one long polyline.
/// - Two or more children: each child's chain becomes a segment rooted
///   at this node with the child's thickness; this node's thickness is
///   the generalized mean `(sum t_i^p)^(1/p)` and a fresh chain starts
///   above the branch point.
fn branch_fold(
    tree: &Tree,
    id: NodeId,
    params: &TopologyParams,
    emitter: &mut impl GeometryEmitter,
) -> (f32, Vec<Vec3>) {
    let node = &tree.nodes[id];

    if node.children.is_empty() {
        return (params.base_thickness, vec![node.pos]);
    }

    if let [only] = node.children[..] {
        let (thickness, mut chain) = branch_fold(tree, only, params, emitter);
        chain.insert(0, node.pos);
        return (thickness, chain);
    }

    let mut acc = 0.0f32;
    for &child in &node.children {
        let (child_thickness, child_chain) = branch_fold(tree, child, params, emitter);

        let mut points = Vec::with_capacity(child_chain.len() + 1);
        points.push(node.pos);
        points.extend(child_chain);

        emitter.emit_segment(Segment {
            points,
            thickness: child_thickness,
            taper: None,
        });
        acc += child_thickness.powf(params.thickness_exp);
    }

    (acc.powf(1.0 / params.thickness_exp), vec![node.pos])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_tree(positions: &[Vec3]) -> Tree {
        let mut tree = Tree::new(positions[0]);
        let mut tip = 0;
        for &pos in &positions[1..] {
            tip = tree.add_child(tip, pos);
        }
        tree
    }

    #[test]
    fn childless_root_emits_one_degenerate_trunk_segment() {
        let tree = Tree::new(Vec3::new(1.0, 2.0, 3.0));
        let mut sink = SegmentCollector::default();

        let thickness = build_topology(&tree, &TopologyParams::default(), &mut sink).unwrap();

        assert_eq!(thickness, 0.005);
        assert_eq!(sink.segments.len(), 1);
        let trunk = &sink.segments[0];
        assert_eq!(trunk.points, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(trunk.thickness, 0.005);
        assert_eq!(trunk.taper, Some(0.7));
    }

    #[test]
    fn unbranched_chain_becomes_a_single_trunk_segment() {
        let positions = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::new(0.0, 0.2, 0.0),
            Vec3::new(0.0, 0.3, 0.0),
        ];
        let tree = chain_tree(&positions);
        let mut sink = SegmentCollector::default();

        let thickness = build_topology(&tree, &TopologyParams::default(), &mut sink).unwrap();

        assert_eq!(thickness, 0.005);
        assert_eq!(sink.segments.len(), 1);
        let trunk = &sink.segments[0];
        assert_eq!(trunk.points, positions.to_vec());
        assert_eq!(trunk.taper, Some(0.7));
    }

    #[test]
    fn two_leaf_children_combine_by_the_pipe_model() {
        let mut tree = Tree::new(Vec3::ZERO);
        tree.add_child(0, Vec3::new(0.1, 0.1, 0.0));
        tree.add_child(0, Vec3::new(-0.1, 0.1, 0.0));
        let mut sink = SegmentCollector::default();

        let thickness = build_topology(&tree, &TopologyParams::default(), &mut sink).unwrap();

        // 0.005 * sqrt(2)
        assert!((thickness - 0.005 * 2.0f32.sqrt()).abs() < 1e-7);

        // One segment per child branch plus the trunk.
        assert_eq!(sink.segments.len(), 3);
        assert_eq!(
            sink.segments[0].points,
            vec![Vec3::ZERO, Vec3::new(0.1, 0.1, 0.0)]
        );
        assert_eq!(sink.segments[0].thickness, 0.005);
        assert_eq!(sink.segments[0].taper, None);
        assert_eq!(
            sink.segments[1].points,
            vec![Vec3::ZERO, Vec3::new(-0.1, 0.1, 0.0)]
        );

        let trunk = &sink.segments[2];
        assert_eq!(trunk.points, vec![Vec3::ZERO]);
        assert_eq!(trunk.thickness, thickness);
        assert_eq!(trunk.taper, Some(0.7));
    }

    #[test]
    fn thickness_is_conserved_through_nested_branch_points() {
        // Root - a - b splits into two leaves; b's thickness feeds a
        // second split at a together with leaf c.
        let mut tree = Tree::new(Vec3::ZERO);
        let a = tree.add_child(0, Vec3::new(0.0, 0.1, 0.0));
        let b = tree.add_child(a, Vec3::new(0.0, 0.2, 0.0));
        let _c = tree.add_child(a, Vec3::new(0.1, 0.2, 0.0));
        tree.add_child(b, Vec3::new(0.0, 0.3, 0.0));
        tree.add_child(b, Vec3::new(0.1, 0.3, 0.0));

        let params = TopologyParams::default();
        let mut sink = SegmentCollector::default();
        let trunk_thickness = build_topology(&tree, &params, &mut sink).unwrap();

        let t0 = params.base_thickness;
        let t_b = (t0 * t0 + t0 * t0).sqrt();
        let t_a = (t_b * t_b + t0 * t0).sqrt();

        assert!((trunk_thickness - t_a).abs() < 1e-7);

        // Inner split at b is emitted before the split at a (post-order),
        // and each emitted chain starts at its branch point.
        let b_segments: Vec<&Segment> = sink
            .segments
            .iter()
            .filter(|s| s.points[0] == Vec3::new(0.0, 0.2, 0.0))
            .collect();
        assert_eq!(b_segments.len(), 2);
        for s in b_segments {
            assert_eq!(s.thickness, t0);
        }

        let a_segments: Vec<&Segment> = sink
            .segments
            .iter()
            .filter(|s| s.points[0] == Vec3::new(0.0, 0.1, 0.0))
            .collect();
        assert_eq!(a_segments.len(), 2);
        let thicknesses: Vec<f32> = a_segments.iter().map(|s| s.thickness).collect();
        assert!(thicknesses.iter().any(|&t| (t - t_b).abs() < 1e-7));
        assert!(thicknesses.iter().any(|&t| (t - t0).abs() < 1e-9));

        // Pipe-model conservation: parent^2 == sum of children^2.
        assert!((t_a * t_a - (t_b * t_b + t0 * t0)).abs() < 1e-9);
    }

    #[test]
    fn single_child_runs_accumulate_into_branch_chains() {
        // Root, then a run of two nodes, then a split into two leaves.
        let mut tree = Tree::new(Vec3::ZERO);
        let a = tree.add_child(0, Vec3::new(0.0, 0.1, 0.0));
        let b = tree.add_child(a, Vec3::new(0.0, 0.2, 0.0));
        tree.add_child(b, Vec3::new(0.1, 0.3, 0.0));
        tree.add_child(b, Vec3::new(-0.1, 0.3, 0.0));

        let mut sink = SegmentCollector::default();
        build_topology(&tree, &TopologyParams::default(), &mut sink).unwrap();

        assert_eq!(sink.segments.len(), 3);
        // The trunk chain runs from the root through the whole
        // unbranched run down to the branch point.
        let trunk = sink.segments.last().unwrap();
        assert_eq!(
            trunk.points,
            vec![
                Vec3::ZERO,
                Vec3::new(0.0, 0.1, 0.0),
                Vec3::new(0.0, 0.2, 0.0)
            ]
        );
        assert!(trunk.taper.is_some());
    }

    #[test]
    fn collector_records_debug_points() {
        let mut sink = SegmentCollector::default();
        sink.emit_points(&[Vec3::ZERO, Vec3::ONE]);
        sink.emit_points(&[Vec3::new(2.0, 0.0, 0.0)]);
        assert_eq!(sink.debug_points.len(), 3);
    }

    #[test]
    fn invalid_params_are_rejected_before_emission() {
        let tree = Tree::new(Vec3::ZERO);

        let mut sink = SegmentCollector::default();
        let mut params = TopologyParams::default();
        params.trunk_taper = 0.0;
        assert_eq!(
            build_topology(&tree, &params, &mut sink),
            Err(TopologyError::InvalidTaper(0.0))
        );

        params = TopologyParams::default();
        params.trunk_taper = 1.5;
        assert!(matches!(
            build_topology(&tree, &params, &mut sink),
            Err(TopologyError::InvalidTaper(_))
        ));

        params = TopologyParams::default();
        params.base_thickness = 0.0;
        assert!(matches!(
            build_topology(&tree, &params, &mut sink),
            Err(TopologyError::InvalidBaseThickness(_))
        ));

        assert!(sink.segments.is_empty());
    }

    #[test]
    fn empty_tree_is_rejected() {
        let tree = Tree { nodes: Vec::new() };
        let mut sink = SegmentCollector::default();
        assert_eq!(
            build_topology(&tree, &TopologyParams::default(), &mut sink),
            Err(TopologyError::EmptyTree)
        );
    }
}
