//! Point-to-disc form factor between two patches, gated by visibility.

use crate::float_types::{PI, Real};
use crate::mesh::bsp::BspTree;
use crate::radiosity::patch::Patch;

/// Shadow segments start and end this far off each surface along its normal.
const RAY_OFFSET: Real = 0.05;

/// Fraction of the energy leaving `src` that arrives at `dst`.
///
/// `cos_s · cos_d · A_d / (π r² + A_d)`, zero when either patch faces away
/// from the other or the tree blocks the segment between them. Never negative.
pub fn form_factor(src: &Patch, dst: &Patch, tree: &BspTree) -> Real {
    let delta = dst.center - src.center;
    let dist_sq = delta.norm_squared();
    if dist_sq <= 0.0 {
        return 0.0;
    }
    let dist = dist_sq.sqrt();
    let dir = delta / dist;

    let cos_src = src.normal.dot(&dir);
    let cos_dst = -dst.normal.dot(&dir);
    if cos_src <= 0.0 || cos_dst <= 0.0 {
        return 0.0;
    }

    // Both ends lifted off their own faces
    let start = src.center + src.normal * RAY_OFFSET;
    let end = dst.center + dst.normal * RAY_OFFSET;
    if tree.segment_obstructed(&start, &end) {
        return 0.0;
    }

    let ff = cos_src * cos_dst * dst.area / (PI * dist_sq + dst.area);
    ff.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::bsp::{BspBuilder, NodeId};
    use crate::mesh::triangle::Triangle;
    use nalgebra::{Point3, Vector3};

    fn patch(center: Point3<Real>, normal: Vector3<Real>, area: Real) -> Patch {
        Patch {
            center,
            normal,
            area,
            reflectivity: Vector3::repeat(0.5),
            emission: Vector3::zeros(),
            accumulated: Vector3::zeros(),
            unshot: Vector3::zeros(),
            node: NodeId::ROOT,
            tri: Some(0),
        }
    }

    #[test]
    fn facing_patches_exchange_energy() {
        let tree = BspTree::default();
        let a = patch(Point3::origin(), Vector3::z(), 1.0);
        let b = patch(Point3::new(0.0, 0.0, 2.0), -Vector3::z(), 1.0);
        let expected = 1.0 / (PI * 4.0 + 1.0);
        assert!((form_factor(&a, &b, &tree) - expected).abs() < 1e-6);
    }

    #[test]
    fn back_to_back_is_zero() {
        let tree = BspTree::default();
        let a = patch(Point3::origin(), -Vector3::z(), 1.0);
        let b = patch(Point3::new(0.0, 0.0, 2.0), Vector3::z(), 1.0);
        assert_eq!(form_factor(&a, &b, &tree), 0.0);
    }

    #[test]
    fn wall_between_blocks_transfer() {
        let wall = Triangle::from_points(
            [
                Point3::new(-5.0, -5.0, 1.0),
                Point3::new(5.0, -5.0, 1.0),
                Point3::new(0.0, 5.0, 1.0),
            ],
            0,
        );
        let tree = BspBuilder::default().build(vec![wall]);
        let a = patch(Point3::origin(), Vector3::z(), 1.0);
        let b = patch(Point3::new(0.0, 0.0, 2.0), -Vector3::z(), 1.0);
        assert_eq!(form_factor(&a, &b, &tree), 0.0);
    }

    #[test]
    fn coincident_centers_are_zero() {
        let tree = BspTree::default();
        let a = patch(Point3::origin(), Vector3::z(), 1.0);
        assert_eq!(form_factor(&a, &a, &tree), 0.0);
    }
}
