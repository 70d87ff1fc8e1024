//! Eigen-factor plane landmarks.
//!
//! An eigen-factor plane does not carry an explicit plane parameter. It stores, for
//! every pose that observed it, the homogeneous second-moment matrix Sᵢ = Σ p̃ p̃ᵀ of
//! the points in that pose's frame. Given poses Tᵢ the points in the world frame have
//! the moment matrix
//!
//! ```text
//! Q = Σᵢ Tᵢ Sᵢ Tᵢᵀ
//! ```
//!
//! and the plane error is the smallest eigenvalue of the centered 3x3 block of Q,
//! i.e. the sum of squared distances of all points to their best common plane.

use crate::graph::{GraphError, PoseId};
use crate::manifold::{LieGroup, SE3};
use crate::planes::{PlaneEquation, homogeneous_scatter};
use nalgebra::{Matrix3, Matrix4, Vector3};
use std::collections::BTreeMap;
use std::fmt;

/// Plane initialisation used by the solver for an eigen-factor landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EigenFactorKind {
    /// Plane re-estimated around the centroid of the accumulated points
    Centered,
    /// Plane and poses updated alternately
    Alternating,
}

impl fmt::Display for EigenFactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EigenFactorKind::Centered => write!(f, "centered"),
            EigenFactorKind::Alternating => write!(f, "alternating"),
        }
    }
}

/// Sufficient statistics contributed by one pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseStatistics {
    pub scatter: Matrix4<f64>,
    pub point_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EigenFactorAccumulator {
    kind: EigenFactorKind,
    per_pose: BTreeMap<PoseId, PoseStatistics>,
    regularization_weight: f64,
}

impl EigenFactorAccumulator {
    pub fn new(kind: EigenFactorKind) -> Self {
        Self {
            kind,
            per_pose: BTreeMap::new(),
            regularization_weight: 0.0,
        }
    }

    pub fn kind(&self) -> EigenFactorKind {
        self.kind
    }

    /// Add `weight`-scaled points observed from `pose`. Repeated calls for the same
    /// pose accumulate.
    pub fn add_points(&mut self, pose: PoseId, points: &[Vector3<f64>], weight: f64) {
        let entry = self.per_pose.entry(pose).or_insert_with(|| PoseStatistics {
            scatter: Matrix4::zeros(),
            point_count: 0,
        });
        entry.scatter += homogeneous_scatter(points) * weight;
        entry.point_count += points.len();
    }

    pub fn add_regularization(&mut self, weight: f64) {
        self.regularization_weight += weight;
    }

    pub fn regularization_weight(&self) -> f64 {
        self.regularization_weight
    }

    pub fn pose_ids(&self) -> impl Iterator<Item = PoseId> + '_ {
        self.per_pose.keys().copied()
    }

    pub fn statistics(&self, pose: PoseId) -> Option<&PoseStatistics> {
        self.per_pose.get(&pose)
    }

    pub fn total_points(&self) -> usize {
        self.per_pose.values().map(|s| s.point_count).sum()
    }

    /// World-frame moment matrix Q = Σ Tᵢ Sᵢ Tᵢᵀ for the given pose estimates.
    pub fn world_scatter(&self, poses: &[SE3]) -> Result<Matrix4<f64>, GraphError> {
        self.per_pose
            .iter()
            .try_fold(Matrix4::zeros(), |acc, (&pose_id, stats)| {
                let pose = poses.get(pose_id).ok_or(GraphError::UnknownPose {
                    pose: pose_id,
                    pose_count: poses.len(),
                })?;
                let transform = pose.matrix();
                Ok(acc + transform * stats.scatter * transform.transpose())
            })
    }

    /// Plane error for the given poses: λ_min of the centered world covariance, plus
    /// the accumulated regularization weight.
    pub fn cost(&self, poses: &[SE3]) -> Result<f64, GraphError> {
        let (_, covariance) = self.centered_moments(poses)?;
        let eigenvalues = covariance.symmetric_eigenvalues();
        Ok(eigenvalues.min().max(0.0) + self.regularization_weight)
    }

    /// Best common plane of all accumulated points in the world frame.
    ///
    /// Returns `None` when no points have been registered.
    pub fn plane_estimate(&self, poses: &[SE3]) -> Result<Option<PlaneEquation>, GraphError> {
        if self.per_pose.is_empty() {
            return Ok(None);
        }
        let (centroid, covariance) = self.centered_moments(poses)?;
        let eigen = covariance.symmetric_eigen();
        let min_index = eigen.eigenvalues.imin();
        let normal: Vector3<f64> = eigen.eigenvectors.column(min_index).into_owned();
        Ok(PlaneEquation::new(normal, -normal.dot(&centroid)))
    }

    fn centered_moments(&self, poses: &[SE3]) -> Result<(Vector3<f64>, Matrix3<f64>), GraphError> {
        let q = self.world_scatter(poses)?;
        let mass = q[(3, 3)];
        if mass <= 0.0 {
            return Ok((Vector3::zeros(), Matrix3::zeros()));
        }
        let first_moment: Vector3<f64> = q.fixed_view::<3, 1>(0, 3).into_owned();
        let centroid = first_moment / mass;
        let second_moment: Matrix3<f64> = q.fixed_view::<3, 3>(0, 0).into_owned();
        let covariance = second_moment - centroid * first_moment.transpose();
        Ok((centroid, covariance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    /// Grid of points on the world plane z = `height`, expressed in the frame of `pose`.
    fn observe_floor(pose: &SE3, height: f64) -> Vec<Vector3<f64>> {
        let inverse = pose.inverse();
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..5 {
                let world = Vector3::new(i as f64 * 0.4 - 1.0, j as f64 * 0.3 - 0.6, height);
                points.push(inverse.act(&world));
            }
        }
        points
    }

    #[test]
    fn test_accumulates_per_pose() {
        let mut accumulator = EigenFactorAccumulator::new(EigenFactorKind::Centered);
        let points = observe_floor(&SE3::identity(), 1.0);
        accumulator.add_points(0, &points, 1.0);
        accumulator.add_points(0, &points, 1.0);
        accumulator.add_points(2, &points[..10], 1.0);

        assert_eq!(accumulator.pose_ids().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(accumulator.total_points(), 70);
        let stats = accumulator.statistics(0);
        assert!(matches!(stats, Some(s) if s.point_count == 60 && (s.scatter[(3, 3)] - 60.0).abs() < TOLERANCE));
    }

    #[test]
    fn test_cost_vanishes_at_true_poses() -> Result<(), GraphError> {
        let poses = vec![
            SE3::identity(),
            SE3::from_translation_euler(0.3, -0.2, 0.5, 0.1, -0.05, 0.4),
        ];
        let mut accumulator = EigenFactorAccumulator::new(EigenFactorKind::Alternating);
        for (id, pose) in poses.iter().enumerate() {
            accumulator.add_points(id, &observe_floor(pose, 1.0), 1.0);
        }

        assert!(accumulator.cost(&poses)? < TOLERANCE);

        let wrong = vec![SE3::identity(), SE3::identity()];
        assert!(accumulator.cost(&wrong)? > 1e-3);
        Ok(())
    }

    #[test]
    fn test_plane_estimate_recovers_world_plane() -> Result<(), GraphError> {
        let poses = vec![
            SE3::identity(),
            SE3::from_translation_euler(-0.4, 0.1, 0.2, 0.0, 0.2, -0.3),
        ];
        let mut accumulator = EigenFactorAccumulator::new(EigenFactorKind::Centered);
        for (id, pose) in poses.iter().enumerate() {
            accumulator.add_points(id, &observe_floor(pose, -2.0), 1.0);
        }
        let plane = accumulator.plane_estimate(&poses)?;
        assert!(matches!(plane, Some(p) if (p.normal().z.abs() - 1.0).abs() < 1e-9 && (p.offset() - 2.0).abs() < 1e-9));
        Ok(())
    }

    #[test]
    fn test_regularization_adds_to_cost() -> Result<(), GraphError> {
        let poses = vec![SE3::identity()];
        let mut accumulator = EigenFactorAccumulator::new(EigenFactorKind::Centered);
        accumulator.add_points(0, &observe_floor(&poses[0], 1.0), 1.0);
        accumulator.add_regularization(0.5);
        assert!((accumulator.cost(&poses)? - 0.5).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_missing_pose_is_an_error() {
        let mut accumulator = EigenFactorAccumulator::new(EigenFactorKind::Centered);
        accumulator.add_points(3, &observe_floor(&SE3::identity(), 1.0), 1.0);
        assert!(matches!(
            accumulator.cost(&[SE3::identity()]),
            Err(GraphError::UnknownPose { pose: 3, .. })
        ));
    }
}
