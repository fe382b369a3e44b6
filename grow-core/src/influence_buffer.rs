use crate::types::NodeId;
use glam::Vec3;

/// Accumulates directional pull per node during one growth pass.
///
/// For each `NodeId` (an index into the tree arena) the buffer stores
/// the running sum of unit direction vectors and how many attractors
/// contributed, so the averaged direction can be queried afterwards.
/// Keying by arena index keeps identity semantics without holding
/// references into the tree.
#[derive(Debug)]
pub struct InfluenceBuffer {
    /// Accumulated direction vectors for each node.
    dir: Vec<Vec3>,
    /// Number of contributions for each node.
    pub count: Vec<u32>,
}

impl InfluenceBuffer {
    /// Creates a zeroed buffer able to hold `len` nodes.
    pub fn with_len(len: usize) -> Self {
        Self {
            dir: vec![Vec3::ZERO; len],
            count: vec![0; len],
        }
    }

    /// Resizes the storage to `len` and clears every entry, even when
    /// the length was already correct.
    pub fn ensure_len(&mut self, len: usize) {
        if self.dir.len() != len {
            self.dir.resize(len, Vec3::ZERO);
            self.count.resize(len, 0);
        }
        self.clear();
    }

    /// Zeroes every entry, keeping the length unchanged.
    pub fn clear(&mut self) {
        for v in &mut self.dir {
            *v = Vec3::ZERO;
        }
        for c in &mut self.count {
            *c = 0;
        }
    }

    /// Adds one directional contribution for the given node.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds for the internal arrays.
    #[inline]
    pub fn add(&mut self, id: NodeId, dir: Vec3) {
        self.dir[id] += dir;
        self.count[id] += 1;
    }

    /// Average contributed direction for a node, or `Vec3::ZERO` when
    /// nothing contributed. The average is *not* renormalized: opposing
    /// pulls cancel out rather than snapping to a unit vector.
    #[inline]
    pub fn avg_dir(&self, id: NodeId) -> Vec3 {
        let c = self.count[id];
        if c == 0 {
            Vec3::ZERO
        } else {
            self.dir[id] / (c as f32)
        }
    }

    #[inline]
    pub fn is_influenced(&self, id: NodeId) -> bool {
        self.count[id] > 0
    }

    /// Node ids with at least one contribution, in ascending id order.
    /// The order is stable, which pins down the order children are
    /// appended in during growth.
    pub fn influenced_indices<'a>(&'a self) -> impl Iterator<Item = NodeId> + 'a {
        self.count
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c > 0 { Some(i) } else { None })
    }
}
