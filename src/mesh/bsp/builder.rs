//! Recursive tree compilation over a flat node pool.

use crate::config::BspConfig;
use crate::errors::Cancelled;
use crate::float_types::Real;
use crate::mesh::bsp::node::{BspTree, Node, NodeId};
use crate::mesh::bsp::traits::{CostHeuristic, SplitterStrategy};
use crate::mesh::plane::Side;
use crate::mesh::triangle::Triangle;
use std::sync::atomic::{AtomicBool, Ordering};

/// Compiles triangle soups into [`BspTree`]s.
#[derive(Debug, Clone)]
pub struct BspBuilder<SP: SplitterStrategy = CostHeuristic> {
    splitting_strategy: SP,
    leaf_size: usize,
    epsilon: Real,
}

impl BspBuilder<CostHeuristic> {
    pub fn new(config: &BspConfig) -> Self {
        Self {
            splitting_strategy: CostHeuristic::from(config),
            leaf_size: config.leaf_size,
            epsilon: config.classify_epsilon,
        }
    }
}

impl Default for BspBuilder<CostHeuristic> {
    fn default() -> Self {
        Self::new(&BspConfig::default())
    }
}

impl<SP: SplitterStrategy> BspBuilder<SP> {
    pub fn with_strategy(strategy: SP, config: &BspConfig) -> Self {
        Self {
            splitting_strategy: strategy,
            leaf_size: config.leaf_size,
            epsilon: config.classify_epsilon,
        }
    }

    /// Build a tree that cannot be cancelled.
    pub fn build(&self, triangles: Vec<Triangle>) -> BspTree {
        let never = AtomicBool::new(false);
        match self.build_cancellable(triangles, &never) {
            Ok(tree) => tree,
            Err(Cancelled) => unreachable!("cancellation flag is local and never set"),
        }
    }

    /// Build a tree, giving up as soon as `cancel` is observed during node
    /// allocation. The partial pool is dropped.
    pub fn build_cancellable(
        &self,
        triangles: Vec<Triangle>,
        cancel: &AtomicBool,
    ) -> Result<BspTree, Cancelled> {
        let mut session = Session {
            builder: self,
            tree: BspTree::default(),
            cancel,
        };
        let root = session.alloc_node()?;
        session.build_node(root, triangles)?;
        Ok(session.tree)
    }
}

struct Session<'a, SP: SplitterStrategy> {
    builder: &'a BspBuilder<SP>,
    tree: BspTree,
    cancel: &'a AtomicBool,
}

impl<SP: SplitterStrategy> Session<'_, SP> {
    /// Append a fresh node to the pool.
    fn alloc_node(&mut self) -> Result<NodeId, Cancelled> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        let id = NodeId(self.tree.nodes.len() as u32);
        self.tree.nodes.push(Node::new());
        Ok(id)
    }

    fn build_node(&mut self, id: NodeId, triangles: Vec<Triangle>) -> Result<(), Cancelled> {
        if triangles.len() <= self.builder.leaf_size {
            let node = self.tree.node_mut(id);
            node.is_leaf = true;
            node.members = triangles;
            return Ok(());
        }

        let splitter = self.builder.splitting_strategy.choose_splitter(&triangles);
        let plane = triangles[splitter].plane();
        let eps = self.builder.epsilon;

        let mut front = Vec::with_capacity(triangles.len() / 2);
        let mut back = Vec::with_capacity(triangles.len() / 2);
        let mut coplanar = Vec::new();

        for tri in triangles {
            match plane.classify_triangle(&tri, eps) {
                Side::Front => front.push(tri),
                Side::Back => back.push(tri),
                Side::Coplanar => coplanar.push(tri),
                Side::Split => plane.split_triangle(&tri, eps, &mut front, &mut back),
            }
        }

        // No progress (only possible when every candidate was degenerate):
        // stop here instead of recursing on the same set forever.
        if coplanar.is_empty() && (front.is_empty() || back.is_empty()) {
            let node = self.tree.node_mut(id);
            node.is_leaf = true;
            node.members = if front.is_empty() { back } else { front };
            return Ok(());
        }

        {
            let node = self.tree.node_mut(id);
            node.plane = plane;
            node.members = coplanar;
        }

        if !front.is_empty() {
            let child = self.alloc_node()?;
            self.tree.node_mut(id).front = Some(child);
            self.build_node(child, front)?;
        }

        if !back.is_empty() {
            let child = self.alloc_node()?;
            self.tree.node_mut(id).back = Some(child);
            self.build_node(child, back)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn horizontal(z: Real) -> Triangle {
        Triangle::from_points(
            [
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(0.0, 1.0, z),
            ],
            0,
        )
    }

    #[test]
    fn empty_input_is_an_empty_leaf() {
        let tree = BspBuilder::default().build(Vec::new());
        assert_eq!(tree.len(), 1);
        assert!(tree.node(NodeId::ROOT).is_leaf);
        assert!(tree.node(NodeId::ROOT).members.is_empty());
    }

    #[test]
    fn small_input_is_a_single_leaf() {
        let tris: Vec<_> = (0..4).map(|i| horizontal(i as Real)).collect();
        let tree = BspBuilder::default().build(tris);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.triangle_count(), 4);
    }

    #[test]
    fn coplanar_triangles_stay_on_the_splitting_node() {
        let config = BspConfig {
            leaf_size: 1,
            good_enough: 0,
            ..BspConfig::default()
        };
        let mut tris: Vec<_> = (0..5).map(|i| horizontal(i as Real)).collect();
        tris.push(horizontal(2.0));
        let tree = BspBuilder::new(&config).build(tris);

        let root = tree.node(NodeId::ROOT);
        assert!(!root.is_leaf);
        assert_eq!(root.members.len(), 2, "both z = 2 triangles sit on the root plane");
        assert!(root.front.is_some());
        assert!(root.back.is_some());
        assert_eq!(tree.triangle_count(), 6);
    }

    #[test]
    fn all_degenerate_input_terminates() {
        let sliver = Triangle::from_points(
            [
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(1.0, 0.0, 5.0),
                Point3::new(2.0, 0.0, 5.0),
            ],
            0,
        );
        let tree = BspBuilder::default().build(vec![sliver; 12]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.triangle_count(), 12);
    }

    #[test]
    fn cancelled_build_stops() {
        let cancel = AtomicBool::new(true);
        let tris: Vec<_> = (0..20).map(|i| horizontal(i as Real)).collect();
        let result = BspBuilder::default().build_cancellable(tris, &cancel);
        assert_eq!(result.unwrap_err(), Cancelled);
    }
}
