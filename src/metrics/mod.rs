//! Trajectory accuracy metrics.
//!
//! - **APE**: absolute pose error after expressing both trajectories relative to
//!   their own first pose.
//! - **RPE**: relative pose error between consecutive motions.
//!
//! Both aggregate the translation norm and the geodesic rotation angle of per-index
//! error transforms as separate root-mean-square values.

use crate::manifold::{ManifoldResult, SE3};
use nalgebra::Matrix4;
use std::fmt;
use thiserror::Error;

pub mod ape;
pub mod rpe;

pub use ape::ape;
pub use rpe::rpe;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("Trajectories differ in length: ground truth has {ground_truth}, estimate has {estimate}")]
    LengthMismatch { ground_truth: usize, estimate: usize },

    #[error("Trajectory too short: {metric} needs at least {required} poses, got {actual}")]
    EmptyTrajectory {
        metric: &'static str,
        required: usize,
        actual: usize,
    },
}

/// RMS translation error (meters) and RMS rotation error (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseError {
    pub translation: f64,
    pub rotation: f64,
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translation: {:.6} m, rotation: {:.6} rad",
            self.translation, self.rotation
        )
    }
}

impl PoseError {
    /// Aggregate error transforms into RMS translation and rotation.
    pub(crate) fn from_error_transforms(errors: &[SE3]) -> Self {
        let n = errors.len().max(1) as f64;
        let (translation_sq, rotation_sq) =
            errors.iter().fold((0.0, 0.0), |(t_acc, r_acc), error| {
                (
                    t_acc + error.distance_translation().powi(2),
                    r_acc + error.distance_rotation().powi(2),
                )
            });
        PoseError {
            translation: (translation_sq / n).sqrt(),
            rotation: (rotation_sq / n).sqrt(),
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.translation, self.rotation)
    }
}

pub(crate) fn check_lengths(ground_truth: &[SE3], estimate: &[SE3]) -> Result<(), MetricsError> {
    if ground_truth.len() != estimate.len() {
        return Err(MetricsError::LengthMismatch {
            ground_truth: ground_truth.len(),
            estimate: estimate.len(),
        });
    }
    Ok(())
}

/// Convert homogeneous matrices into poses, rejecting any that is not a rigid transform.
pub fn trajectory_from_matrices(matrices: &[Matrix4<f64>]) -> ManifoldResult<Vec<SE3>> {
    matrices.iter().map(SE3::from_matrix).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::ManifoldError;

    #[test]
    fn test_trajectory_from_matrices_rejects_singular_pose() {
        let mut singular = Matrix4::identity();
        singular[(0, 0)] = 0.0;
        let result = trajectory_from_matrices(&[Matrix4::identity(), singular]);
        assert!(matches!(result, Err(ManifoldError::SingularTransform(_))));
    }

    #[test]
    fn test_pose_error_display() {
        let error = PoseError {
            translation: 0.5,
            rotation: 0.25,
        };
        assert_eq!(
            error.to_string(),
            "translation: 0.500000 m, rotation: 0.250000 rad"
        );
    }
}
