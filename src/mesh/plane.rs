//! Splitting planes, triangle classification and triangle splitting.

use crate::float_types::{Real, tolerance};
use crate::mesh::triangle::Triangle;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// Where a triangle lies relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// No vertex strictly behind, at least one strictly in front.
    Front,
    /// No vertex strictly in front, at least one strictly behind.
    Back,
    /// All three vertices inside the epsilon band.
    Coplanar,
    /// Vertices strictly on both sides.
    Split,
}

/// A plane `n · p = w` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Default for Plane {
    fn default() -> Self {
        Plane {
            normal: Vector3::z(),
            w: 0.0,
        }
    }
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and an offset along it.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        let len = normal.norm();
        if len < tolerance() {
            return Plane::default();
        }
        Plane {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Create a plane through three points.
    /// The normal follows the right-hand rule: `(b - a) × (c - a)`.
    /// Collinear points yield the `+Z` plane through the origin.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Self {
        let normal = (b - a).cross(&(c - a));
        if normal.norm_squared() < tolerance() * tolerance() {
            return Plane::default();
        }
        let normal = normal.normalize();
        Plane {
            normal,
            w: normal.dot(&a.coords),
        }
    }

    /// Positive in front (the side the normal points to), negative behind.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<Real>) -> Real {
        self.normal.dot(&p.coords) - self.w
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Classify a triangle against this plane with an `eps`-wide band.
    ///
    /// Exactly one of the four cases holds:
    /// `Coplanar` iff all |d| ≤ eps, otherwise `Front` iff no d < -eps,
    /// `Back` iff no d > eps, `Split` otherwise.
    pub fn classify_triangle(&self, tri: &Triangle, eps: Real) -> Side {
        let mut front = 0;
        let mut back = 0;
        for v in &tri.vertices {
            let d = self.signed_distance(&v.pos);
            if d > eps {
                front += 1;
            } else if d < -eps {
                back += 1;
            }
        }

        match (front, back) {
            (0, 0) => Side::Coplanar,
            (_, 0) => Side::Front,
            (0, _) => Side::Back,
            _ => Side::Split,
        }
    }

    /// Cut `tri` by this plane, pushing the fan-triangulated pieces onto
    /// `front` and `back`. Pieces keep the source material.
    ///
    /// Distances inside the `eps` band are snapped to zero, so on-plane
    /// vertices are shared by both sides and every emitted piece classifies
    /// as `Front` (from `front`) or `Back` (from `back`) against the same plane.
    pub fn split_triangle(
        &self,
        tri: &Triangle,
        eps: Real,
        front: &mut Vec<Triangle>,
        back: &mut Vec<Triangle>,
    ) {
        let dists = tri.vertices.map(|v| {
            let d = self.signed_distance(&v.pos);
            if d.abs() <= eps { 0.0 } else { d }
        });

        let mut front_poly: Vec<Vertex> = Vec::with_capacity(4);
        let mut back_poly: Vec<Vertex> = Vec::with_capacity(4);

        for i in 0..3 {
            let j = (i + 1) % 3;
            let (vi, vj) = (&tri.vertices[i], &tri.vertices[j]);
            let (di, dj) = (dists[i], dists[j]);

            if di >= 0.0 {
                front_poly.push(*vi);
            }
            if di <= 0.0 {
                back_poly.push(*vi);
            }

            if di * dj < 0.0 {
                let hinge = vi.interpolate(vj, di / (di - dj));
                front_poly.push(hinge);
                back_poly.push(hinge);
            }
        }

        fan_triangulate(&front_poly, tri.material, front);
        fan_triangulate(&back_poly, tri.material, back);
    }
}

/// Connect vertex 0 to every consecutive pair.
fn fan_triangulate(poly: &[Vertex], material: usize, out: &mut Vec<Triangle>) {
    if poly.len() < 3 {
        return;
    }
    out.extend(
        (1..poly.len() - 1).map(|i| Triangle::new([poly[0], poly[i], poly[i + 1]], material)),
    );
}
