//! Binary Space Partitioning (BSP) tree compilation and queries
//!
//! The tree is stored as a flat node pool indexed by [`NodeId`]. Building is
//! parameterised by a [`SplitterStrategy`], so alternative splitter
//! heuristics can be dropped in without touching the recursion.

pub mod builder;
pub mod node;
pub mod raycast;
pub mod render;
pub mod traits;

pub use builder::BspBuilder;
pub use node::{BspTree, Node, NodeId};
pub use raycast::{ray_hits_triangle, segment_hits_triangle};
pub use render::{DebugMode, DrawTarget, NodeInfo, depth_color, node_color};
pub use traits::{CostHeuristic, SplitterStrategy};
