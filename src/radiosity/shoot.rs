//! One step of progressive refinement: the brightest patch shoots.

use crate::mesh::bsp::BspTree;
use crate::radiosity::Radiosity;
use crate::radiosity::form_factor::form_factor;
use crate::radiosity::patch::Patch;
use nalgebra::Vector3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl Radiosity {
    /// Index of the patch holding the most unshot energy, if any holds some.
    /// Ties go to the lowest index.
    pub fn brightest_patch(&self) -> Option<usize> {
        let mut best = None;
        let mut best_energy = 0.0;
        for (i, patch) in self.patches.iter().enumerate() {
            let energy = patch.unshot_energy();
            if energy > best_energy {
                best_energy = energy;
                best = Some(i);
            }
        }
        best
    }

    /// Shoot the brightest patch's unshot energy to every other patch.
    /// Returns `false` once nothing above the convergence threshold is left.
    pub fn iterate(&mut self, tree: &BspTree) -> bool {
        let Some(shooter) = self.brightest_patch() else {
            return false;
        };
        if self.patches[shooter].unshot_energy() < self.config.convergence_threshold {
            return false;
        }

        let source = self.patches[shooter].clone();
        distribute(&mut self.patches, shooter, &source, tree);
        self.patches[shooter].unshot = Vector3::zeros();
        self.iterations += 1;

        log::trace!(
            "radiosity iteration {}: shot patch {} ({:.4} energy)",
            self.iterations,
            shooter,
            source.unshot_energy()
        );
        true
    }
}

/// Credit `receiver` with what it picks up from `source`.
#[inline]
fn receive_from(receiver: &mut Patch, source: &Patch, tree: &BspTree) {
    let ff = form_factor(source, receiver, tree);
    if ff <= 0.0 {
        return;
    }
    let reflected = (source.unshot * ff).component_mul(&receiver.reflectivity);
    receiver.receive(&reflected);
}

#[cfg(not(feature = "parallel"))]
fn distribute(patches: &mut [Patch], shooter: usize, source: &Patch, tree: &BspTree) {
    patches
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| *i != shooter)
        .for_each(|(_, receiver)| receive_from(receiver, source, tree));
}

#[cfg(feature = "parallel")]
fn distribute(patches: &mut [Patch], shooter: usize, source: &Patch, tree: &BspTree) {
    patches
        .par_iter_mut()
        .enumerate()
        .filter(|(i, _)| *i != shooter)
        .for_each(|(_, receiver)| receive_from(receiver, source, tree));
}
