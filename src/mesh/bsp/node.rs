//! BSP tree node data structure

use crate::mesh::plane::Plane;
use crate::mesh::triangle::Triangle;

/// Index of a node in [`BspTree::nodes`]. The pool grows while building, so
/// nodes refer to each other by index, never by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A BSP tree node.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Splitting plane. Meaningless for leaves.
    pub plane: Plane,

    /// Subtree in front of `plane`.
    pub front: Option<NodeId>,

    /// Subtree behind `plane`.
    pub back: Option<NodeId>,

    /// Triangles lying on `plane` for internal nodes (the renderable
    /// "walls"), or every remaining triangle for a leaf.
    pub members: Vec<Triangle>,

    pub is_leaf: bool,
}

impl Node {
    /// Create a new empty, non-leaf BSP node
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        self.front.into_iter().chain(self.back)
    }
}

/// A compiled tree: a flat node pool with the root at index 0.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    pub nodes: Vec<Node>,
}

impl BspTree {
    /// The root, or `None` for a tree that was never built.
    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId::ROOT)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every stored triangle, node by node in pool order.
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.nodes.iter().flat_map(|n| n.members.iter())
    }

    /// Mutable access to every stored triangle.
    pub fn triangles_mut(&mut self) -> impl Iterator<Item = &mut Triangle> {
        self.nodes.iter_mut().flat_map(|n| n.members.iter_mut())
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(|n| n.members.len()).sum()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.node(id).children().map(|c| (c, depth + 1)));
        }
        deepest
    }
}
