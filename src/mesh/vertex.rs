//! Struct and functions for working with `Vertex`s from which `Triangle`s are composed.

use crate::float_types::{Real, tolerance};
use crate::mesh::material::Color;
use nalgebra::{Point3, Vector3};

/// A triangle corner: position, shading normal, two UV sets and a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    pub uv: [Real; 2],
    /// Secondary UV set. Carried through splitting, never read.
    pub uv2: [Real; 2],
    /// Vertex color. Replaced by baked lighting.
    pub color: Color,
}

impl Vertex {
    /// Create a new [`Vertex`] with zero UVs and a white color.
    ///
    /// * `pos`    – the position in world space
    /// * `normal` – shading normal; it is **copied verbatim**, the BSP and the
    ///   lighting code derive their own face normals from positions.
    ///
    /// Non-finite coordinates are replaced by zero.
    #[inline]
    pub fn new(mut pos: Point3<Real>, mut normal: Vector3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        for c in normal.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex {
            pos,
            normal,
            uv: [0.0; 2],
            uv2: [0.0; 2],
            color: Color::WHITE,
        }
    }

    pub const fn with_uv(mut self, uv: [Real; 2]) -> Self {
        self.uv = uv;
        self
    }

    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Return the linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// Position, UVs and color are blended linearly. The normal is blended
    /// linearly and renormalised; if the blend collapses (opposite normals),
    /// `self.normal` is kept.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;

        let blended = self.normal + (other.normal - self.normal) * t;
        let normal = if blended.norm_squared() > tolerance() {
            blended.normalize()
        } else {
            self.normal
        };

        let lerp2 = |a: [Real; 2], b: [Real; 2]| [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];

        Vertex {
            pos,
            normal,
            uv: lerp2(self.uv, other.uv),
            uv2: lerp2(self.uv2, other.uv2),
            color: self.color.lerp(&other.color, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_blends_every_attribute() {
        let a = Vertex::new(Point3::origin(), Vector3::x())
            .with_uv([0.0, 0.0])
            .with_color(Color::BLACK);
        let b = Vertex::new(Point3::new(2.0, 0.0, 0.0), Vector3::y())
            .with_uv([1.0, 2.0])
            .with_color(Color::WHITE);

        let m = a.interpolate(&b, 0.5);
        assert_eq!(m.pos, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(m.uv, [0.5, 1.0]);
        assert!((m.color.r - 0.5).abs() < 1e-9);
        assert!((m.normal.norm() - 1.0).abs() < 1e-6, "normal is renormalised");
        assert!((m.normal.x - m.normal.y).abs() < 1e-6);
    }

    #[test]
    fn opposite_normals_keep_first() {
        let a = Vertex::new(Point3::origin(), Vector3::z());
        let b = Vertex::new(Point3::new(1.0, 0.0, 0.0), -Vector3::z());
        assert_eq!(a.interpolate(&b, 0.5).normal, Vector3::z());
    }

    #[test]
    fn non_finite_input_is_sanitised() {
        let v = Vertex::new(Point3::new(Real::NAN, 1.0, 2.0), Vector3::new(0.0, Real::INFINITY, 1.0));
        assert_eq!(v.pos, Point3::new(0.0, 1.0, 2.0));
        assert_eq!(v.normal, Vector3::z());
    }
}
