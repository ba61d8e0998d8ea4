//! Progressive-refinement radiosity over the faces of a compiled [`BspTree`].
//!
//! Every stored triangle becomes a [`Patch`]. Sky light is injected once by
//! hemisphere sampling, then the brightest patch repeatedly shoots its unshot
//! energy to every patch it can see ([`Radiosity::iterate`]). The tree is
//! both the patch source and the visibility oracle. [`Radiosity::bake`]
//! writes tone-mapped, smoothed colors back into the tree's vertices.

pub mod bake;
pub mod directions;
pub mod form_factor;
pub mod hemisphere;
pub mod patch;
pub mod shoot;

pub use directions::{DirectionCursor, DirectionTable};
pub use form_factor::form_factor;
pub use patch::Patch;

use crate::config::RadiosityConfig;
use crate::float_types::Real;
use crate::mesh::bsp::{BspTree, NodeId};
use crate::mesh::material::MaterialSet;

/// Lighting state for one tree.
#[derive(Debug, Clone)]
pub struct Radiosity {
    patches: Vec<Patch>,
    directions: DirectionTable,
    config: RadiosityConfig,
    iterations: usize,
}

impl Radiosity {
    /// Create one patch per stored triangle (plus virtual back faces when
    /// `two_sided` is set) and inject the sky light.
    pub fn prepare(tree: &BspTree, materials: &MaterialSet, config: &RadiosityConfig) -> Self {
        let mut patches = Vec::with_capacity(tree.triangle_count());
        for (n, node) in tree.nodes.iter().enumerate() {
            let id = NodeId(n as u32);
            for (t, tri) in node.members.iter().enumerate() {
                let patch = Patch::from_triangle(tri, id, t, materials);
                if config.two_sided {
                    let back = patch.back_face();
                    patches.push(patch);
                    patches.push(back);
                } else {
                    patches.push(patch);
                }
            }
        }

        let mut radiosity = Radiosity {
            patches,
            directions: DirectionTable::new(config.direction_table_size, config.seed),
            config: config.clone(),
            iterations: 0,
        };
        radiosity.add_hemisphere_light(
            tree,
            &config.sky_color,
            &config.ground_color,
            config.sky_intensity,
            config.sky_samples,
        );
        radiosity
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Shooting iterations performed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn config(&self) -> &RadiosityConfig {
        &self.config
    }

    /// Sum of every patch's unshot R+G+B.
    pub fn total_unshot(&self) -> Real {
        self.patches.iter().map(Patch::unshot_energy).sum()
    }

    /// Iterate until converged or `max_iterations` is reached.
    /// Returns the number of iterations performed by this call.
    pub fn solve(&mut self, tree: &BspTree) -> usize {
        let start = self.iterations;
        while self.iterations < self.config.max_iterations && self.iterate(tree) {}
        self.iterations - start
    }
}
