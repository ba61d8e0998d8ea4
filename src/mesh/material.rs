//! Surface colors and the diffuse + emissive material pairs triangles refer to.

use crate::float_types::Real;
use nalgebra::Vector3;
use std::ops::Index;

/// Linear RGBA color. Channels are not clamped; lighting values may exceed 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Real,
    pub g: Real,
    pub b: Real,
    pub a: Real,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn new(r: Real, g: Real, b: Real, a: Real) -> Self {
        Color { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: Real, g: Real, b: Real) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    /// Channel-wise `self + (other - self) * t`, alpha included.
    pub fn lerp(&self, other: &Color, t: Real) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// RGB as a vector, for energy arithmetic.
    pub fn rgb_vector(&self) -> Vector3<Real> {
        Vector3::new(self.r, self.g, self.b)
    }

    /// Opaque color from an RGB vector.
    pub fn from_rgb_vector(v: &Vector3<Real>) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }

    /// Pack into `0xAARRGGBB`, clamping each channel to `[0, 1]`.
    pub fn to_argb(&self) -> u32 {
        let q = |c: Real| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.a) << 24) | (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Reflectivity plus self-illumination.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Fraction of incoming light reflected per channel (0..=1).
    pub diffuse: Color,
    /// Light emitted per unit area.
    pub emissive: Color,
    /// Multiplier on `emissive`.
    pub power: Real,
}

impl Material {
    pub const fn new(diffuse: Color, emissive: Color) -> Self {
        Material {
            diffuse,
            emissive,
            power: 1.0,
        }
    }

    pub const fn with_power(mut self, power: Real) -> Self {
        self.power = power;
        self
    }

    /// Non-emissive surface reflecting `grey` in every channel.
    pub const fn grey(grey: Real) -> Self {
        Material::new(Color::rgb(grey, grey, grey), Color::BLACK)
    }

    /// RGB emission after applying `power`.
    pub fn emission(&self) -> Vector3<Real> {
        self.emissive.rgb_vector() * self.power
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::grey(0.5)
    }
}

/// Materials indexed by [`Triangle::material`](crate::mesh::triangle::Triangle::material).
/// Never empty: an empty list is replaced by a single default material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSet {
    materials: Vec<Material>,
}

impl MaterialSet {
    pub fn new(materials: Vec<Material>) -> Self {
        if materials.is_empty() {
            return Self::default();
        }
        MaterialSet { materials }
    }

    pub fn get(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

impl Default for MaterialSet {
    fn default() -> Self {
        MaterialSet {
            materials: vec![Material::default()],
        }
    }
}

impl Index<usize> for MaterialSet {
    type Output = Material;

    fn index(&self, index: usize) -> &Material {
        &self.materials[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_gets_default_material() {
        let set = MaterialSet::new(Vec::new());
        assert_eq!(set.len(), 1);
        assert_eq!(set[0], Material::grey(0.5));
    }

    #[test]
    fn emission_applies_power() {
        let m = Material::new(Color::BLACK, Color::rgb(1.0, 0.5, 0.0)).with_power(2.0);
        assert_eq!(m.emission(), Vector3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn argb_packing_clamps() {
        assert_eq!(Color::new(2.0, 0.0, 1.0, 1.0).to_argb(), 0xFFFF00FF);
    }
}
