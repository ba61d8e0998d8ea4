//! Camera-relative ordered traversal, the hook a renderer draws through.

use crate::float_types::Real;
use crate::mesh::bsp::node::{BspTree, NodeId};
use crate::mesh::material::Color;
use crate::mesh::triangle::Triangle;
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How [`NodeInfo::debug_color`] is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugMode {
    /// Always white; draw with baked vertex colors.
    #[default]
    None,
    /// Gradient by tree depth: red → yellow → green → blue.
    Depth,
    /// A stable pseudo-random color per leaf, grey for internal nodes.
    Leaf,
}

/// What the renderer learns about the node whose triangles it is drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub depth: usize,
    pub is_leaf: bool,
    pub debug_color: Color,
}

/// The graphics-device side of rendering. Implemented by the host.
pub trait DrawTarget {
    /// Draw one node's member triangles. Never called with an empty slice.
    fn draw_triangles(&mut self, triangles: &[Triangle], node: NodeInfo);
}

/// Color for a tree depth.
pub fn depth_color(depth: usize) -> Color {
    let d = depth as Real;
    if depth < 5 {
        Color::rgb(1.0, d / 5.0, 0.0)
    } else if depth < 10 {
        Color::rgb(1.0 - (d - 5.0) / 5.0, 1.0, 0.0)
    } else {
        let g = (1.0 - (d - 10.0) / 10.0).max(0.0);
        let b = ((d - 10.0) / 10.0).min(1.0);
        Color::rgb(0.0, g, b)
    }
}

/// Stable pseudo-random color per node, seeded by its index.
pub fn node_color(id: NodeId) -> Color {
    let mut rng = StdRng::seed_from_u64(u64::from(id.0) * 12345);
    Color::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
}

impl BspTree {
    /// Visit every non-empty node far-to-near relative to `camera`:
    /// for a camera in front of a node's plane, back subtree, then the node,
    /// then the front subtree; the reverse when behind it.
    pub fn render<T: DrawTarget + ?Sized>(&self, camera: &Point3<Real>, mode: DebugMode, target: &mut T) {
        let Some(root) = self.root() else {
            return;
        };

        // Explicit stack: Visit(node) expands into children, Draw(node) emits members
        enum Step {
            Visit(NodeId, usize),
            Draw(NodeId, usize),
        }

        let mut stack = vec![Step::Visit(root, 0)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Draw(id, depth) => {
                    let node = self.node(id);
                    if node.members.is_empty() {
                        continue;
                    }
                    let debug_color = match mode {
                        DebugMode::None => Color::WHITE,
                        DebugMode::Depth => depth_color(depth),
                        DebugMode::Leaf if node.is_leaf => node_color(id),
                        DebugMode::Leaf => Color::rgb(0.2, 0.2, 0.2),
                    };
                    target.draw_triangles(
                        &node.members,
                        NodeInfo {
                            id,
                            depth,
                            is_leaf: node.is_leaf,
                            debug_color,
                        },
                    );
                },
                Step::Visit(id, depth) => {
                    let node = self.node(id);
                    if node.is_leaf {
                        stack.push(Step::Draw(id, depth));
                        continue;
                    }

                    let (far, near) = if node.plane.signed_distance(camera) > 0.0 {
                        (node.back, node.front)
                    } else {
                        (node.front, node.back)
                    };

                    // Pushed in reverse: far subtree pops first
                    if let Some(near) = near {
                        stack.push(Step::Visit(near, depth + 1));
                    }
                    stack.push(Step::Draw(id, depth));
                    if let Some(far) = far {
                        stack.push(Step::Visit(far, depth + 1));
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_gradient_endpoints() {
        assert_eq!(depth_color(0), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(depth_color(5), Color::rgb(1.0, 1.0, 0.0));
        assert_eq!(depth_color(30), Color::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn node_colors_are_stable() {
        assert_eq!(node_color(NodeId(7)), node_color(NodeId(7)));
        assert_ne!(node_color(NodeId(7)), node_color(NodeId(8)));
    }
}
