use crate::types::NodeId;
use glam::Vec3;

/// One sample point on the grown branch skeleton.
///
/// Nodes are created once and only ever mutated by appending to
/// `children`; the tree never shrinks.
#[derive(Debug)]
pub struct TreeNode {
    pub pos: Vec3,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Rooted branching structure stored as an arena.
///
/// `nodes[0]` is the root. Every other node has exactly one parent and
/// was appended through [`Tree::add_child`], so the structure is always
/// connected and acyclic. Child lists keep insertion order, which fixes
/// the iteration order everywhere downstream.
#[derive(Debug)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new_root(pos: Vec3) -> Self {
        Self {
            pos,
            parent: None,
            children: Vec::with_capacity(4),
        }
    }

    pub fn new_child(pos: Vec3, parent: NodeId) -> Self {
        Self {
            pos,
            parent: Some(parent),
            children: Vec::with_capacity(4),
        }
    }
}

impl Tree {
    pub fn new(root_pos: Vec3) -> Self {
        Self {
            nodes: vec![TreeNode::new_root(root_pos)],
        }
    }

    /// Id of the root node. Only meaningful on a non-empty tree.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    /// Appends a new node under `parent` and returns its id.
    pub fn add_child(&mut self, parent: NodeId, pos: Vec3) -> NodeId {
        let id: usize = self.nodes.len();
        self.nodes.push(TreeNode::new_child(pos, parent));
        self.nodes[parent].children.push(id);
        id
    }
}
