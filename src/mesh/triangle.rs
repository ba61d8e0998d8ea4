//! The triangle soup every phase of the level compiler works on.

use crate::float_types::{Real, tolerance};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// Three corners plus an index into the [`MaterialSet`](crate::mesh::material::MaterialSet).
/// A plain value: copied freely while subdividing and splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub material: usize,
}

impl Triangle {
    pub const fn new(vertices: [Vertex; 3], material: usize) -> Self {
        Triangle { vertices, material }
    }

    /// Triangle whose shading normals are the face normal.
    pub fn from_points(points: [Point3<Real>; 3], material: usize) -> Self {
        let normal = face_normal_of(&points[0], &points[1], &points[2]);
        Triangle::new(points.map(|p| Vertex::new(p, normal)), material)
    }

    /// Plane through the three positions.
    pub fn plane(&self) -> Plane {
        let [a, b, c] = &self.vertices;
        Plane::from_points(&a.pos, &b.pos, &c.pos)
    }

    /// `½ · |(b - a) × (c - a)|`
    pub fn area(&self) -> Real {
        let [a, b, c] = &self.vertices;
        (b.pos - a.pos).cross(&(c.pos - a.pos)).norm() * 0.5
    }

    /// Vertex average.
    pub fn centroid(&self) -> Point3<Real> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.pos.coords + b.pos.coords + c.pos.coords) / 3.0)
    }

    /// Flat normal from the winding, ignoring the stored shading normals.
    /// Zero for degenerate triangles.
    pub fn face_normal(&self) -> Vector3<Real> {
        let [a, b, c] = &self.vertices;
        face_normal_of(&a.pos, &b.pos, &c.pos)
    }

    /// Squared lengths of edges `ab`, `bc`, `ca`.
    pub fn edge_lengths_squared(&self) -> [Real; 3] {
        let [a, b, c] = &self.vertices;
        [
            (a.pos - b.pos).norm_squared(),
            (b.pos - c.pos).norm_squared(),
            (c.pos - a.pos).norm_squared(),
        ]
    }

    /// True when the three positions do not span a plane.
    pub fn is_degenerate(&self) -> bool {
        self.area() <= tolerance()
    }
}

fn face_normal_of(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Vector3<Real> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len <= tolerance() { Vector3::zeros() } else { n / len }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_triangle_metrics() {
        let t = Triangle::from_points(
            [
                Point3::origin(),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            0,
        );
        assert!((t.area() - 2.0).abs() < 1e-9);
        assert_eq!(t.face_normal(), Vector3::z());
        assert_eq!(t.vertices[1].normal, Vector3::z());
        assert_eq!(t.edge_lengths_squared(), [4.0, 8.0, 4.0]);
        let c = t.centroid();
        assert!((c - Point3::new(2.0 / 3.0, 2.0 / 3.0, 0.0)).norm() < 1e-6);
        assert!(!t.is_degenerate());
    }

    #[test]
    fn collinear_triangle_is_degenerate() {
        let t = Triangle::from_points(
            [
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
            ],
            0,
        );
        assert!(t.is_degenerate());
        assert_eq!(t.face_normal(), Vector3::zeros());
    }
}
