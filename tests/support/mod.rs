//! Test support library
//! Provides scene builders and comparison helpers shared by the integration tests.
#![allow(dead_code)]

use bsp_radiosity::{
    Color, Material, MaterialSet, RadiosityConfig, Triangle,
    float_types::Real,
    shapes::{Face, quad, room},
};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Sum of triangle areas.
pub fn total_area<'a>(triangles: impl IntoIterator<Item = &'a Triangle>) -> Real {
    triangles.into_iter().map(Triangle::area).sum()
}

/// Material 0: grey 0.5. Material 1: white emitter with unit power.
pub fn grey_and_light() -> MaterialSet {
    MaterialSet::new(vec![
        Material::grey(0.5),
        Material::new(Color::BLACK, Color::WHITE),
    ])
}

/// Lighting config with the sky switched off.
pub fn dark_sky() -> RadiosityConfig {
    RadiosityConfig {
        sky_intensity: 0.0,
        ..RadiosityConfig::default()
    }
}

/// Closed `size`³ box, faces pointing inward, the top face emitting (material 1).
pub fn lit_box(size: Real) -> Vec<Triangle> {
    room(size, size, size, |f| if f == Face::Top { 1 } else { 0 })
}

/// `n` random non-degenerate triangles inside `[-extent, extent]³`.
pub fn random_soup(seed: u64, n: usize, extent: Real) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let point = |rng: &mut StdRng| {
        Point3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    };
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let tri = Triangle::from_points([point(&mut rng), point(&mut rng), point(&mut rng)], 0);
        if tri.area() > 0.01 {
            out.push(tri);
        }
    }
    out
}

/// Random point strictly inside the axis-aligned box `[min, max]`, at least
/// `margin` away from every face.
pub fn random_point_in(rng: &mut StdRng, min: Point3<Real>, max: Point3<Real>, margin: Real) -> Point3<Real> {
    Point3::new(
        rng.gen_range(min.x + margin..max.x - margin),
        rng.gen_range(min.y + margin..max.y - margin),
        rng.gen_range(min.z + margin..max.z - margin),
    )
}

/// Wall in the plane at `x`, spanning `y ∈ [0, length]`, `z ∈ [0, height]`.
pub fn wall_at_x(x: Real, length: Real, height: Real) -> [Triangle; 2] {
    quad(
        [
            Point3::new(x, 0.0, 0.0),
            Point3::new(x, length, 0.0),
            Point3::new(x, length, height),
            Point3::new(x, 0.0, height),
        ],
        0,
    )
}
