//! Sky light injection by hemisphere sampling.

use crate::float_types::{Real, TAU};
use crate::mesh::bsp::BspTree;
use crate::mesh::material::Color;
use crate::radiosity::Radiosity;
use crate::radiosity::directions::DirectionCursor;
use crate::radiosity::patch::Patch;
use nalgebra::Vector3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sample rays start this far off the surface.
const START_OFFSET: Real = 0.005;

/// A ray unobstructed for this long has reached the sky.
const SKY_DISTANCE: Real = 100_000.0;

/// Sky gradient, shared by every sampling task.
struct Sky {
    sky: Vector3<Real>,
    ground: Vector3<Real>,
    intensity: Real,
    samples: usize,
}

impl Sky {
    /// Flux reflected by `patch` from the sky, or `None` if no sample escaped.
    fn gather(&self, patch: &Patch, cursor: &mut DirectionCursor<'_>, tree: &BspTree) -> Option<Vector3<Real>> {
        let start = patch.center + patch.normal * START_OFFSET;
        let mut incoming = Vector3::zeros();
        let mut escaped = false;

        for _ in 0..self.samples {
            let dir = cursor.hemisphere(&patch.normal);
            if tree.is_obstructed(&start, &dir, SKY_DISTANCE) {
                continue;
            }
            escaped = true;
            let t = 0.5 * (dir.y + 1.0);
            let radiance = self.ground.lerp(&self.sky, t);
            incoming += radiance * patch.normal.dot(&dir).max(0.0);
        }

        if !escaped {
            return None;
        }
        let scale = self.intensity * TAU / self.samples as Real;
        Some((incoming * scale * patch.area).component_mul(&patch.reflectivity))
    }
}

impl Radiosity {
    /// Add the light arriving from an open sky to every patch that can see it.
    /// Directions pointing up see `sky`, pointing down see `ground`.
    pub fn add_hemisphere_light(
        &mut self,
        tree: &BspTree,
        sky: &Color,
        ground: &Color,
        intensity: Real,
        samples: usize,
    ) {
        if samples == 0 || self.patches.is_empty() {
            return;
        }
        let light = Sky {
            sky: sky.rgb_vector(),
            ground: ground.rgb_vector(),
            intensity,
            samples,
        };
        self.gather_sky(tree, &light);
    }

    #[cfg(not(feature = "parallel"))]
    fn gather_sky(&mut self, tree: &BspTree, light: &Sky) {
        let directions = &self.directions;
        self.patches.iter_mut().enumerate().for_each(|(i, patch)| {
            let mut cursor = directions.cursor(i);
            if let Some(flux) = light.gather(patch, &mut cursor, tree) {
                patch.receive(&flux);
            }
        });
    }

    #[cfg(feature = "parallel")]
    fn gather_sky(&mut self, tree: &BspTree, light: &Sky) {
        let directions = &self.directions;
        self.patches.par_iter_mut().enumerate().for_each(|(i, patch)| {
            let mut cursor = directions.cursor(i);
            if let Some(flux) = light.gather(patch, &mut cursor, tree) {
                patch.receive(&flux);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RadiosityConfig;
    use crate::mesh::bsp::{BspBuilder, BspTree};
    use crate::mesh::material::{Color, MaterialSet};
    use crate::mesh::triangle::Triangle;
    use crate::radiosity::Radiosity;
    use nalgebra::Point3;

    fn floor() -> Triangle {
        Triangle::from_points(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            0,
        )
    }

    #[test]
    fn open_floor_receives_sky_light() {
        let tree = BspBuilder::default().build(vec![floor()]);
        let rad = Radiosity::prepare(&tree, &MaterialSet::default(), &RadiosityConfig::default());
        let p = &rad.patches()[0];
        assert!(p.accumulated.x > 0.0);
        assert!(p.unshot.x > 0.0);
    }

    #[test]
    fn ceiling_blocks_sky_light() {
        let big = 1000.0;
        let ceiling = Triangle::from_points(
            [
                Point3::new(-big, 1.0, -big),
                Point3::new(big, 1.0, -big),
                Point3::new(0.0, 1.0, big),
            ],
            0,
        );
        let tree: BspTree = BspBuilder::default().build(vec![floor(), ceiling]);
        let config = RadiosityConfig {
            sky_color: Color::WHITE,
            ..RadiosityConfig::default()
        };
        let rad = Radiosity::prepare(&tree, &MaterialSet::default(), &config);
        let floor_patch = rad
            .patches()
            .iter()
            .find(|p| p.normal.y > 0.5)
            .expect("floor patch");
        // Upward rays all hit the ceiling; grazing rays may still escape sideways
        assert!(floor_patch.accumulated.y < 0.5);
    }
}
