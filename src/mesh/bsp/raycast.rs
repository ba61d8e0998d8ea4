//! Shadow-ray queries against a compiled tree.
//!
//! Only "is anything in the way" is answered; hit positions are never
//! computed. Queries are read-only and allocation-free so they can run from
//! many rayon tasks at once. Segments are open: a triangle touching an
//! endpoint does not block it, from whichever end the query starts.

use crate::float_types::Real;
use crate::mesh::bsp::node::{BspTree, NodeId};
use crate::mesh::triangle::Triangle;
use nalgebra::{Point3, Vector3};

/// Band around a splitting plane inside which a segment endpoint counts as on both sides.
const PLANE_EPSILON: Real = 1e-5;

/// Determinant / distance epsilon of the triangle test.
const HIT_EPSILON: Real = 1e-6;

/// Double-sided Möller–Trumbore test. True if the ray `orig + t·dir` (unit
/// `dir`) hits `tri` with `HIT_EPSILON < t < max_dist`.
pub fn ray_hits_triangle(
    orig: &Point3<Real>,
    dir: &Vector3<Real>,
    max_dist: Real,
    tri: &Triangle,
) -> bool {
    let [v0, v1, v2] = [&tri.vertices[0].pos, &tri.vertices[1].pos, &tri.vertices[2].pos];
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);

    // Parallel to the triangle (either winding)
    if det.abs() < HIT_EPSILON {
        return false;
    }
    let inv_det = 1.0 / det;

    let tvec = orig - v0;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let qvec = tvec.cross(&edge1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = edge2.dot(&qvec) * inv_det;
    t > HIT_EPSILON && t < max_dist
}

/// Does `tri` cross the open segment `(a, b)`?
///
/// Touching either endpoint does not count, so the answer is the same for
/// `(b, a)` up to rounding.
pub fn segment_hits_triangle(a: &Point3<Real>, b: &Point3<Real>, tri: &Triangle) -> bool {
    let seg = b - a;
    let len = seg.norm();
    len > 2.0 * HIT_EPSILON && ray_hits_triangle(a, &(seg / len), len - HIT_EPSILON, tri)
}

/// Fixed orientation for a segment: `(a, b)` and `(b, a)` map to the same
/// pair, so a query does all of its arithmetic identically either way.
fn canonical<'a>(a: &'a Point3<Real>, b: &'a Point3<Real>) -> (&'a Point3<Real>, &'a Point3<Real>) {
    let key = |p: &Point3<Real>| [p.x, p.y, p.z];
    if key(b) < key(a) { (b, a) } else { (a, b) }
}

/// A segment being walked down the tree. Sub-segments are parameter ranges
/// of the whole, so member hits are always measured on the full segment.
struct Segment {
    origin: Point3<Real>,
    dir: Vector3<Real>,
    len: Real,
}

impl Segment {
    fn at(&self, t: Real) -> Point3<Real> {
        self.origin + self.dir * t
    }

    fn crosses(&self, tri: &Triangle) -> bool {
        ray_hits_triangle(&self.origin, &self.dir, self.len - HIT_EPSILON, tri)
    }
}

impl BspTree {
    /// Is there any stored triangle within `max_distance` of `start` along `dir`?
    pub fn is_obstructed(&self, start: &Point3<Real>, dir: &Vector3<Real>, max_distance: Real) -> bool {
        let len = dir.norm();
        if len == 0.0 || max_distance <= 0.0 {
            return false;
        }
        let end = start + dir * (max_distance / len);
        self.segment_obstructed(start, &end)
    }

    /// Is the open segment `(a, b)` crossed by any stored triangle?
    ///
    /// The answer does not depend on the direction of the segment. Geometry
    /// that only touches an endpoint does not obstruct it.
    pub fn segment_obstructed(&self, a: &Point3<Real>, b: &Point3<Real>) -> bool {
        let (a, b) = canonical(a, b);
        let seg = b - a;
        let len = seg.norm();
        if len <= 2.0 * HIT_EPSILON {
            return false;
        }
        let segment = Segment {
            origin: *a,
            dir: seg / len,
            len,
        };
        self.check_node(self.root(), &segment, 0.0, len)
    }

    /// Walk the part `[t0, t1]` of `seg` through the subtree at `id`.
    fn check_node(&self, id: Option<NodeId>, seg: &Segment, t0: Real, t1: Real) -> bool {
        let Some(id) = id else {
            return false;
        };
        let node = self.node(id);

        if node.members.iter().any(|tri| seg.crosses(tri)) {
            return true;
        }
        if node.is_leaf {
            return false;
        }

        let d0 = node.plane.signed_distance(&seg.at(t0));
        let d1 = node.plane.signed_distance(&seg.at(t1));
        let in_front = d0 >= -PLANE_EPSILON && d1 >= -PLANE_EPSILON;
        let behind = d0 <= PLANE_EPSILON && d1 <= PLANE_EPSILON;

        match (in_front, behind) {
            // Lying in the plane band: either side may hold geometry it touches
            (true, true) => {
                self.check_node(node.front, seg, t0, t1) || self.check_node(node.back, seg, t0, t1)
            },
            (true, false) => self.check_node(node.front, seg, t0, t1),
            (false, true) => self.check_node(node.back, seg, t0, t1),
            (false, false) => {
                // One end is beyond the band on each side
                let t = t0 + (t1 - t0) * d0 / (d0 - d1);
                let (near, far) = if d0 > 0.0 {
                    (node.front, node.back)
                } else {
                    (node.back, node.front)
                };
                self.check_node(near, seg, t0, t) || self.check_node(far, seg, t, t1)
            },
        }
    }
}
