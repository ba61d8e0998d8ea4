//! Writing the lighting solution into vertex colors.

use crate::float_types::Real;
use crate::mesh::bsp::BspTree;
use crate::mesh::material::Color;
use crate::radiosity::Radiosity;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

/// Reinhard operator `c / (1 + c)` per channel.
pub fn tone_map(c: &Vector3<Real>) -> Vector3<Real> {
    c.map(|x| x / (1.0 + x))
}

/// Vertex identity for smoothing: position and shading normal snapped to
/// grids, so coincident corners of neighbouring triangles share a color
/// while creases (different normals) stay sharp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmoothKey {
    position_quantized: (i64, i64, i64),
    normal_quantized: (i64, i64, i64),
}

impl SmoothKey {
    pub fn new(pos: &Point3<Real>, normal: &Vector3<Real>, position_eps: Real, normal_eps: Real) -> Self {
        let q = |v: Real, eps: Real| (v / eps).round() as i64;
        SmoothKey {
            position_quantized: (q(pos.x, position_eps), q(pos.y, position_eps), q(pos.z, position_eps)),
            normal_quantized: (q(normal.x, normal_eps), q(normal.y, normal_eps), q(normal.z, normal_eps)),
        }
    }
}

/// Running sum of the colors contributed to one smoothing key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAccumulator {
    sum: Vector3<Real>,
    count: u32,
}

impl ColorAccumulator {
    pub fn add(&mut self, c: &Vector3<Real>) {
        self.sum += c;
        self.count += 1;
    }

    /// Opaque average, black when nothing was added.
    pub fn average(&self) -> Color {
        if self.count == 0 {
            return Color::BLACK;
        }
        Color::from_rgb_vector(&(self.sum / self.count as Real))
    }
}

impl Radiosity {
    /// Tone-map every patch's radiosity, average it over vertices sharing a
    /// [`SmoothKey`] and store the result in the tree's vertex colors.
    /// Virtual patches and patches whose triangle no longer exists are skipped.
    /// Vertices no patch contributed to keep their color.
    pub fn bake(&self, tree: &mut BspTree) {
        let pos_eps = self.config.smooth_position_epsilon;
        let normal_eps = self.config.smooth_normal_epsilon;
        let mut smoothing: HashMap<SmoothKey, ColorAccumulator> = HashMap::new();

        for patch in &self.patches {
            let Some(t) = patch.tri else {
                continue;
            };
            let Some(tri) = tree.nodes.get(patch.node.index()).and_then(|n| n.members.get(t)) else {
                continue;
            };
            let toned = tone_map(&patch.accumulated);
            for v in &tri.vertices {
                smoothing
                    .entry(SmoothKey::new(&v.pos, &v.normal, pos_eps, normal_eps))
                    .or_default()
                    .add(&toned);
            }
        }

        for tri in tree.triangles_mut() {
            for v in &mut tri.vertices {
                let key = SmoothKey::new(&v.pos, &v.normal, pos_eps, normal_eps);
                if let Some(acc) = smoothing.get(&key) {
                    v.color = acc.average();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinhard_maps_into_unit_range() {
        let c = tone_map(&Vector3::new(0.0, 1.0, 1000.0));
        assert_eq!(c.x, 0.0);
        assert_eq!(c.y, 0.5);
        assert!(c.z < 1.0 && c.z > 0.99);
    }

    #[test]
    fn nearby_vertices_share_a_key() {
        let n = Vector3::z();
        let a = SmoothKey::new(&Point3::new(1.0, 2.0, 3.0), &n, 1e-3, 0.1);
        let b = SmoothKey::new(&Point3::new(1.0001, 2.0, 3.0), &n, 1e-3, 0.1);
        let c = SmoothKey::new(&Point3::new(1.0, 2.0, 3.0), &Vector3::x(), 1e-3, 0.1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn accumulator_averages_and_is_opaque() {
        let mut acc = ColorAccumulator::default();
        assert_eq!(acc.average(), Color::BLACK);
        acc.add(&Vector3::new(1.0, 0.0, 0.0));
        acc.add(&Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(acc.average(), Color::rgb(0.5, 0.0, 0.5));
    }

    #[test]
    fn vertices_without_patches_keep_their_color() {
        use crate::config::RadiosityConfig;
        use crate::mesh::bsp::BspBuilder;
        use crate::mesh::material::MaterialSet;
        use crate::mesh::triangle::Triangle;

        let lit = Triangle::from_points(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 0.5),
                Point3::new(0.5, 0.0, 0.0),
            ],
            0,
        );
        let mut tree = BspBuilder::default().build(vec![lit]);
        let rad = Radiosity::prepare(&tree, &MaterialSet::default(), &RadiosityConfig::default());

        let marker = Color::rgb(0.2, 0.4, 0.6);
        let mut stray = Triangle::from_points(
            [
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.5),
                Point3::new(10.5, 0.0, 0.0),
            ],
            0,
        );
        for v in &mut stray.vertices {
            v.color = marker;
        }
        tree.nodes[0].members.push(stray);

        rad.bake(&mut tree);
        let baked: Vec<_> = tree.triangles().collect();
        assert!(baked[0].vertices.iter().all(|v| v.color != marker && v.color.a == 1.0));
        assert!(baked[1].vertices.iter().all(|v| v.color == marker));
    }
}
