//! Random SE(3) perturbations used to derive noisy initial trajectories from ground truth.

use crate::manifold::{LieGroup, SE3, SE3Tangent, Tangent};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::fmt;

/// Magnitudes of a pose perturbation: rotation in radians, translation in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    pub rotation_shift: f64,
    pub translation_shift: f64,
}

impl Perturbation {
    pub fn new(rotation_shift: f64, translation_shift: f64) -> Self {
        Self {
            rotation_shift,
            translation_shift,
        }
    }

    /// Draw one rigid offset with these magnitudes.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SE3 {
        sample_perturbation(rng, self.rotation_shift, self.translation_shift)
    }
}

/// Formats as `{rotation}_{translation}`, the suffix used for perturbed trajectory files.
impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.rotation_shift, self.translation_shift)
    }
}

/// Vector of length `radius` with a direction drawn through spherical coordinates
/// θ ~ U(0, 2π), φ ~ U(0, π).
pub fn generate_uniform_vector<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> Vector3<f64> {
    let theta = rng.random_range(0.0..2.0 * PI);
    let phi = rng.random_range(0.0..PI);
    Vector3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

/// Random rigid offset: exp of [ρ, θ] where θ has norm `rotation_radius` and ρ has
/// norm `translation_radius`.
pub fn sample_perturbation<R: Rng + ?Sized>(
    rng: &mut R,
    rotation_radius: f64,
    translation_radius: f64,
) -> SE3 {
    let theta = generate_uniform_vector(rng, rotation_radius);
    let rho = generate_uniform_vector(rng, translation_radius);
    SE3Tangent::new(rho, theta).exp()
}

/// Shift every pose after the first by an independent perturbation (T ∘ ΔT).
///
/// The first pose is the anchor of the pose graph and is returned unchanged.
pub fn perturb_trajectory<R: Rng + ?Sized>(
    rng: &mut R,
    trajectory: &[SE3],
    perturbation: &Perturbation,
) -> Vec<SE3> {
    trajectory
        .iter()
        .enumerate()
        .map(|(index, pose)| {
            if index == 0 {
                pose.clone()
            } else {
                pose.compose(&perturbation.sample(rng))
            }
        })
        .collect()
}

/// One perturbed trajectory of a batch: shift magnitudes, sample index and RNG seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbationJob {
    pub perturbation: Perturbation,
    pub sample: usize,
    pub seed: u64,
}

impl PerturbationJob {
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// Every (rotation shift, translation shift, sample) combination of a batch.
///
/// Job `k` is seeded with `seed + k` (wrapping), so no two jobs share a random stream.
pub fn perturbation_jobs(
    rotation_shifts: &[f64],
    translation_shifts: &[f64],
    samples: usize,
    seed: u64,
) -> Vec<PerturbationJob> {
    rotation_shifts
        .iter()
        .flat_map(|&rotation| {
            translation_shifts
                .iter()
                .map(move |&translation| Perturbation::new(rotation, translation))
        })
        .flat_map(|perturbation| (0..samples).map(move |sample| (perturbation, sample)))
        .enumerate()
        .map(|(index, (perturbation, sample))| PerturbationJob {
            perturbation,
            sample,
            seed: seed.wrapping_add(index as u64),
        })
        .collect()
}
