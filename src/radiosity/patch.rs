//! Lighting patches: one per stored triangle face.

use crate::float_types::{MIN_PATCH_AREA, Real};
use crate::mesh::bsp::NodeId;
use crate::mesh::material::MaterialSet;
use crate::mesh::triangle::Triangle;
use nalgebra::{Point3, Vector3};

/// Reflectivity given to triangles whose material index does not resolve.
const MISSING_REFLECTIVITY: Vector3<Real> = Vector3::new(0.0, 1.0, 0.0);

/// Offset of a virtual back patch from its front face.
const BACK_FACE_OFFSET: Real = 0.01;

/// A surface element exchanging light with every other patch.
/// All energy quantities are RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub center: Point3<Real>,
    pub normal: Vector3<Real>,
    pub area: Real,
    pub reflectivity: Vector3<Real>,
    pub emission: Vector3<Real>,
    /// Radiosity gathered so far (per unit area).
    pub accumulated: Vector3<Real>,
    /// Flux received but not yet redistributed.
    pub unshot: Vector3<Real>,
    /// Node whose member list holds the source triangle.
    pub node: NodeId,
    /// Index of the source triangle in that node's members, `None` for
    /// virtual patches that have no triangle to bake into.
    pub tri: Option<usize>,
}

impl Patch {
    /// Patch for `node.members[index]`. An out-of-range material gives a
    /// non-emissive green surface.
    pub fn from_triangle(tri: &Triangle, node: NodeId, index: usize, materials: &MaterialSet) -> Self {
        let (reflectivity, emission) = match materials.get(tri.material) {
            Some(m) => (m.diffuse.rgb_vector(), m.emission()),
            None => (MISSING_REFLECTIVITY, Vector3::zeros()),
        };
        let area = tri.area();

        Patch {
            center: tri.centroid(),
            normal: tri.face_normal(),
            area,
            reflectivity,
            emission,
            accumulated: emission,
            unshot: emission * area,
            node,
            tri: Some(index),
        }
    }

    /// The unlit, non-reflective back side of this patch.
    pub fn back_face(&self) -> Self {
        let normal = -self.normal;
        Patch {
            center: self.center + normal * BACK_FACE_OFFSET,
            normal,
            area: self.area,
            reflectivity: Vector3::zeros(),
            emission: Vector3::zeros(),
            accumulated: Vector3::zeros(),
            unshot: Vector3::zeros(),
            node: self.node,
            tri: None,
        }
    }

    /// Sum of the unshot channels.
    #[inline]
    pub fn unshot_energy(&self) -> Real {
        self.unshot.x + self.unshot.y + self.unshot.z
    }

    /// Credit `flux` to this patch: radiosity grows by `flux / area`
    /// (skipped for vanishing areas), unshot grows by `flux`.
    #[inline]
    pub fn receive(&mut self, flux: &Vector3<Real>) {
        if self.area > MIN_PATCH_AREA {
            self.accumulated += flux / self.area;
        }
        self.unshot += flux;
    }
}
