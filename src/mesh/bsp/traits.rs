//! Traits defining how a BSP node picks its splitting plane

use crate::config::BspConfig;
use crate::float_types::Real;
use crate::mesh::plane::Side;
use crate::mesh::triangle::Triangle;

/// Trait for picking the splitting triangle of a node
pub trait SplitterStrategy {
    /// Index into `triangles` of the triangle whose plane splits this node.
    /// Only called with a non-empty slice.
    fn choose_splitter(&self, triangles: &[Triangle]) -> usize;
}

/// Greedy cost heuristic trading tree balance against the number of splits.
///
/// Score of a candidate plane: `|front - back| + splits * split_penalty`,
/// where a split triangle counts toward front, back and splits. Candidates are
/// tried in input order (every `stride`-th one) and the search stops at the
/// first new best scoring below `good_enough`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostHeuristic {
    pub split_penalty: usize,
    pub stride: usize,
    pub good_enough: usize,
    pub epsilon: Real,
}

impl Default for CostHeuristic {
    fn default() -> Self {
        Self::from(&BspConfig::default())
    }
}

impl From<&BspConfig> for CostHeuristic {
    fn from(config: &BspConfig) -> Self {
        CostHeuristic {
            split_penalty: config.split_penalty,
            stride: config.stride.max(1),
            good_enough: config.good_enough,
            epsilon: config.classify_epsilon,
        }
    }
}

impl CostHeuristic {
    /// Score the plane of `triangles[candidate]` against every other triangle.
    pub fn score(&self, triangles: &[Triangle], candidate: usize) -> usize {
        let plane = triangles[candidate].plane();
        let (front, back, splits) = triangles
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != candidate)
            .map(|(_, t)| match plane.classify_triangle(t, self.epsilon) {
                Side::Front => (1, 0, 0),
                Side::Back => (0, 1, 0),
                Side::Split => (1, 1, 1),
                Side::Coplanar => (0, 0, 0),
            })
            .fold((0usize, 0usize, 0usize), |acc, x| {
                (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2)
            });

        front.abs_diff(back) + splits * self.split_penalty
    }
}

impl SplitterStrategy for CostHeuristic {
    fn choose_splitter(&self, triangles: &[Triangle]) -> usize {
        let mut best_index = 0;
        let mut best_score = usize::MAX;

        for i in (0..triangles.len()).step_by(self.stride.max(1)) {
            // A degenerate triangle has no plane of its own
            if triangles[i].is_degenerate() {
                continue;
            }

            let score = self.score(triangles, i);
            if score < best_score {
                best_score = score;
                best_index = i;
                if score < self.good_enough {
                    break;
                }
            }
        }

        best_index
    }
}
