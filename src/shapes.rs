//! Simple level geometry for tests and demos.

use crate::float_types::Real;
use crate::mesh::triangle::Triangle;
use nalgebra::Point3;

/// Faces of an axis-aligned box, in the order [`room`] takes their materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// z = 0
    Bottom,
    /// z = height
    Top,
    /// y = 0
    Front,
    /// y = length
    Back,
    /// x = 0
    Left,
    /// x = width
    Right,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::Bottom, Face::Top, Face::Front, Face::Back, Face::Left, Face::Right];
}

/// Two triangles `[a, b, c]` and `[a, c, d]` covering a planar quad.
/// The face normal follows the winding `a → b → c`.
pub fn quad(corners: [Point3<Real>; 4], material: usize) -> [Triangle; 2] {
    let [a, b, c, d] = corners;
    [
        Triangle::from_points([a, b, c], material),
        Triangle::from_points([a, c, d], material),
    ]
}

/// Closed box from the origin to `(width, length, height)` with every face
/// pointing inward, two triangles per face.
/// `material(face)` picks each face's material index.
pub fn room(width: Real, length: Real, height: Real, material: impl Fn(Face) -> usize) -> Vec<Triangle> {
    //     4-------5
    //    /|      /|
    //   0-------1 |
    //   | |     | |
    //   | 7-----|-6
    //   |/      |/
    //   3-------2
    let corners = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(width, 0.0, 0.0),
        Point3::new(width, length, 0.0),
        Point3::new(0.0, length, 0.0),
        Point3::new(0.0, 0.0, height),
        Point3::new(width, 0.0, height),
        Point3::new(width, length, height),
        Point3::new(0.0, length, height),
    ];

    // Wound clockwise seen from outside, so normals face the interior
    let faces = [
        (Face::Bottom, [0, 1, 2, 3]),
        (Face::Top, [4, 7, 6, 5]),
        (Face::Front, [0, 4, 5, 1]),
        (Face::Back, [3, 2, 6, 7]),
        (Face::Left, [0, 3, 7, 4]),
        (Face::Right, [1, 5, 6, 2]),
    ];

    faces
        .into_iter()
        .flat_map(|(face, idx)| quad(idx.map(|i| corners[i]), material(face)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn room_normals_point_inside() {
        let tris = room(2.0, 3.0, 4.0, |_| 0);
        assert_eq!(tris.len(), 12);
        let center = Point3::new(1.0, 1.5, 2.0);
        for tri in &tris {
            let to_center: Vector3<Real> = center - tri.centroid();
            assert!(tri.face_normal().dot(&to_center) > 0.0);
        }
    }

    #[test]
    fn room_assigns_face_materials() {
        let tris = room(1.0, 1.0, 1.0, |f| if f == Face::Top { 1 } else { 0 });
        let top: Vec<_> = tris.iter().filter(|t| t.material == 1).collect();
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|t| t.face_normal().z < -0.99));
    }
}
