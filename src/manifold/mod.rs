//! Lie group representations for rigid-body poses.
//!
//! This module provides the two groups the evaluation harness needs:
//! - **SE(3)**: Special Euclidean group (camera poses, pose perturbations)
//! - **SO(3)**: Special Orthogonal group (rotation part of a pose)
//!
//! Lie group M,° | size   | dim | X ∈ M                   | Constraint      | T_X M                 | Exp(T)             | Comp. | Action
//! ------------- | ------ | --- | ----------------------- | --------------- | --------------------- | ------------------ | ----- | ------
//! Rotation      | SO(3),.| 9   | 3   | R                 | RᵀR = I         | [θ] ∈ R³              | R = exp([θ]x)      | R₁R₂  | Rx
//! Rigid motion  | SE(3),.| 16  | 6   | M = [R t; 0 1]    | RᵀR = I         | [v̂] ∈ R⁶              | Exp([v̂])           | M₁M₂  | Rx+t
//!
//! The conventions follow the [manif](https://github.com/artivis/manif) C++ library:
//! SE(3) tangent vectors are ordered [rho(3), theta(3)], translation first.
//!
//! Only the exponential map is provided on SE(3); rotation errors go through the SO(3)
//! logarithm. Linearisation belongs to the graph solver.

use nalgebra::Vector3;
use std::fmt::Debug;
use thiserror::Error;

pub mod se3;
pub mod so3;

pub use se3::{SE3, SE3Tangent};
pub use so3::{SO3, SO3Tangent};

/// Default tolerance used when validating homogeneous matrices.
pub const RIGID_TOLERANCE: f64 = 1e-6;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// The matrix is not a valid rigid-body transform (and thus not safely invertible)
    #[error("Singular or non-rigid transform: {0}")]
    SingularTransform(String),
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Core trait for Lie group operations used by the harness.
pub trait LieGroup: Clone + Debug + PartialEq {
    /// Homogeneous matrix representation of the group
    type Matrix: Clone + Debug + PartialEq;

    /// Get the identity element of the group.
    fn identity() -> Self;

    /// Compute the inverse g⁻¹ such that g ∘ g⁻¹ = e.
    fn inverse(&self) -> Self;

    /// Compose this element with another (group multiplication g₁ ∘ g₂).
    fn compose(&self, other: &Self) -> Self;

    /// Compute g₁⁻¹ ∘ g₂ (relative transformation).
    fn between(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }

    /// Act on a vector v: g ⊙ v.
    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64>;

    /// Homogeneous matrix of this element.
    fn matrix(&self) -> Self::Matrix;
}

/// Lie algebra (tangent space) vectors that map onto a group.
pub trait Tangent<G: LieGroup>: Clone + Debug + PartialEq {
    /// Exponential map to Lie group: exp(φ^∧).
    fn exp(&self) -> G;
}
