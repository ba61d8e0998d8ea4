//! Adaptive midpoint subdivision into roughly uniform lighting patches.

use crate::config::SubdivideConfig;
use crate::mesh::triangle::Triangle;

/// Split every triangle with an over-long edge into 4 until all edges fit
/// under `max_edge`.
///
/// A triangle is split only if some edge exceeds `max_edge` **and** every
/// edge exceeds `min_edge`; slivers with a short edge are kept as they are
/// so the recursion always terminates. `max_depth` caps the recursion
/// independently of the geometry.
pub fn subdivide(triangles: &[Triangle], config: &SubdivideConfig) -> Vec<Triangle> {
    let mut out = Vec::with_capacity(triangles.len());
    for tri in triangles {
        subdivide_into(tri.clone(), config, 0, &mut out);
    }
    out
}

fn needs_split(tri: &Triangle, config: &SubdivideConfig) -> bool {
    let max_sq = config.max_edge * config.max_edge;
    let min_sq = config.min_edge * config.min_edge;
    let edges = tri.edge_lengths_squared();
    edges.iter().any(|&e| e > max_sq) && edges.iter().all(|&e| e > min_sq)
}

fn subdivide_into(tri: Triangle, config: &SubdivideConfig, depth: u32, out: &mut Vec<Triangle>) {
    if depth >= config.max_depth || !needs_split(&tri, config) {
        out.push(tri);
        return;
    }

    let [v0, v1, v2] = tri.vertices;
    let m01 = v0.interpolate(&v1, 0.5);
    let m12 = v1.interpolate(&v2, 0.5);
    let m20 = v2.interpolate(&v0, 0.5);
    let material = tri.material;

    for child in [
        [v0, m01, m20],
        [m01, v1, m12],
        [m20, m12, v2],
        [m01, m12, m20],
    ] {
        subdivide_into(Triangle::new(child, material), config, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::Real;
    use nalgebra::Point3;

    fn big_triangle(size: Real) -> Triangle {
        Triangle::from_points(
            [
                Point3::origin(),
                Point3::new(size, 0.0, 0.0),
                Point3::new(0.0, size, 0.0),
            ],
            2,
        )
    }

    #[test]
    fn splits_until_edges_fit() {
        let config = SubdivideConfig {
            max_edge: 1.0,
            min_edge: 0.1,
            max_depth: 16,
        };
        let out = subdivide(&[big_triangle(2.0)], &config);
        // hypotenuse 2√2 → 1.41 → 0.71
        assert_eq!(out.len(), 16);
        let max_sq = config.max_edge * config.max_edge;
        for t in &out {
            assert!(t.edge_lengths_squared().iter().all(|&e| e <= max_sq));
            assert_eq!(t.material, 2);
        }
        let area: Real = out.iter().map(Triangle::area).sum();
        assert!((area - 2.0).abs() < 1e-6);
    }

    #[test]
    fn depth_cap_bounds_output() {
        let config = SubdivideConfig {
            max_edge: 1e-3,
            min_edge: 1e-6,
            max_depth: 2,
        };
        assert_eq!(subdivide(&[big_triangle(10.0)], &config).len(), 16);
    }

    #[test]
    fn short_edge_blocks_split() {
        let sliver = Triangle::from_points(
            [
                Point3::origin(),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(10.0, 0.05, 0.0),
            ],
            0,
        );
        let out = subdivide(&[sliver.clone()], &SubdivideConfig::default());
        assert_eq!(out, vec![sliver]);
    }
}
