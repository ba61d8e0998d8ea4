//! Precomputed unit directions for hemisphere sampling.

use crate::float_types::Real;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Preferred step between consecutive cursor positions.
const CURSOR_STRIDE: usize = 12345;

/// A fixed table of unit vectors spread over the sphere.
#[derive(Debug, Clone)]
pub struct DirectionTable {
    dirs: Vec<Vector3<Real>>,
    /// Coprime with `dirs.len()`, so a cursor visits every entry before repeating.
    stride: usize,
}

impl DirectionTable {
    /// `size` directions drawn by rejection sampling in the unit cube.
    /// The same seed always yields the same table.
    pub fn new(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let size = size.max(1);
        let dirs = (0..size).map(|_| random_unit_vector(&mut rng)).collect();
        DirectionTable {
            dirs,
            stride: coprime_stride(size),
        }
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Cursor starting at `start` (wrapped to the table size).
    pub fn cursor(&self, start: usize) -> DirectionCursor<'_> {
        DirectionCursor {
            table: self,
            index: start % self.dirs.len(),
        }
    }
}

/// Smallest step `>= CURSOR_STRIDE` sharing no factor with `size`.
fn coprime_stride(size: usize) -> usize {
    fn gcd(mut a: usize, mut b: usize) -> usize {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }
    (CURSOR_STRIDE..)
        .find(|&s| gcd(s, size) == 1)
        .unwrap_or(1)
}

fn random_unit_vector(rng: &mut impl Rng) -> Vector3<Real> {
    loop {
        let x: Real = rng.gen_range(-1.0..1.0);
        let y: Real = rng.gen_range(-1.0..1.0);
        let z: Real = rng.gen_range(-1.0..1.0);
        let v = Vector3::new(x, y, z);
        let len2 = v.norm_squared();
        if len2 > 0.01 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}

/// Walks a [`DirectionTable`] with a fixed stride. Each task owns its own cursor.
#[derive(Debug, Clone)]
pub struct DirectionCursor<'a> {
    table: &'a DirectionTable,
    index: usize,
}

impl DirectionCursor<'_> {
    /// Next direction on the side of `normal` (flipped if it points the other way).
    pub fn hemisphere(&mut self, normal: &Vector3<Real>) -> Vector3<Real> {
        self.index = (self.index + self.table.stride) % self.table.dirs.len();
        let dir = self.table.dirs[self.index];
        if dir.dot(normal) < 0.0 { -dir } else { dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unit_length() {
        let table = DirectionTable::new(256, 7);
        assert_eq!(table.len(), 256);
        for d in &table.dirs {
            assert!((d.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn same_seed_same_table() {
        let a = DirectionTable::new(64, 42);
        let b = DirectionTable::new(64, 42);
        assert_eq!(a.dirs, b.dirs);
    }

    #[test]
    fn hemisphere_samples_face_the_normal() {
        let table = DirectionTable::new(4096, 1);
        let n = Vector3::new(0.0, 1.0, 0.0);
        let mut cursor = table.cursor(3);
        for _ in 0..500 {
            assert!(cursor.hemisphere(&n).dot(&n) >= 0.0);
        }
    }

    #[test]
    fn cursor_visits_every_entry_of_small_tables() {
        for size in [3, 5, 15, 823, 4096] {
            let table = DirectionTable::new(size, 9);
            let mut cursor = table.cursor(0);
            let mut seen = vec![false; size];
            for _ in 0..size {
                cursor.hemisphere(&Vector3::z());
                seen[cursor.index] = true;
            }
            assert!(seen.iter().all(|&s| s), "size {size}");
        }
        assert_eq!(DirectionTable::new(4096, 0).stride, CURSOR_STRIDE);
    }
}
