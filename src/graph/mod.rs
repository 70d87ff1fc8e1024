//! Pose graph with planar landmarks.
//!
//! The graph is a passive container: pose nodes (one anchor, the rest free), plane
//! landmarks in one of two parameterizations, and the factors that link them. The
//! parameterization backends fill it and a [`GraphSolver`] consumes it.

use crate::manifold::SE3;
use crate::planes::PlaneEquation;
use nalgebra::{Matrix4, Vector3, Vector4};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub mod eigen_factor;
pub mod solver;

pub use eigen_factor::{EigenFactorAccumulator, EigenFactorKind, PoseStatistics};
pub use solver::{GraphSolver, InitialGuessSolver, OptimizationMode, SolverError};

/// Index of a pose node; equals the frame index of the trajectory.
pub type PoseId = usize;

/// Opaque handle of a plane landmark owned by a [`PlaneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LandmarkId(usize);

impl LandmarkId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Errors raised while building a pose graph
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Initial poses count {poses} does not match observation count {observations}")]
    PoseCountMismatch { poses: usize, observations: usize },

    #[error("Unknown pose node {pose} (graph has {pose_count} poses)")]
    UnknownPose { pose: PoseId, pose_count: usize },

    #[error("Unknown landmark {0}")]
    UnknownLandmark(LandmarkId),

    #[error("Landmark {landmark} is a {actual} node, expected {expected}")]
    LandmarkKindMismatch {
        landmark: LandmarkId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Whether a pose node is held fixed by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoseNodeMode {
    /// Gauge-fixing node, never updated
    Anchor,
    #[default]
    Standard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseNode {
    pub mode: PoseNodeMode,
    pub initial: SE3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandmarkNode {
    /// Implicit plane defined by accumulated point statistics
    EigenPlane(EigenFactorAccumulator),
    /// Explicit plane parameter π = [n; d]
    Plane4d { initial: Vector4<f64> },
}

impl LandmarkNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LandmarkNode::EigenPlane(_) => "eigen-factor plane",
            LandmarkNode::Plane4d { .. } => "4d plane",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    /// Points of one frame registered into an eigen-factor landmark
    EigenPoints {
        pose: PoseId,
        landmark: LandmarkId,
        point_count: usize,
        weight: f64,
    },
    /// Plane-intersection factor: residual πᵀ T S Tᵀ π of one frame's moment matrix
    PiFactor {
        pose: PoseId,
        landmark: LandmarkId,
        scatter: Matrix4<f64>,
    },
    /// Plane measured in the pose frame, compared with the landmark mapped into it
    PosePlane4d {
        pose: PoseId,
        landmark: LandmarkId,
        measurement: PlaneEquation,
        information: Matrix4<f64>,
    },
}

impl Factor {
    pub fn pose(&self) -> PoseId {
        match self {
            Factor::EigenPoints { pose, .. }
            | Factor::PiFactor { pose, .. }
            | Factor::PosePlane4d { pose, .. } => *pose,
        }
    }

    pub fn landmark(&self) -> LandmarkId {
        match self {
            Factor::EigenPoints { landmark, .. }
            | Factor::PiFactor { landmark, .. }
            | Factor::PosePlane4d { landmark, .. } => *landmark,
        }
    }
}

/// Summary counts of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStatistics {
    pub poses: usize,
    pub anchors: usize,
    pub landmarks: usize,
    pub eigen_planes: usize,
    pub factors: usize,
    pub registered_points: usize,
}

impl fmt::Display for GraphStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaneGraph Statistics:\n\
             Poses: {} (anchors: {})\n\
             Landmarks: {} (eigen-factor: {}, 4d: {})\n\
             Factors: {}\n\
             Registered points: {}",
            self.poses,
            self.anchors,
            self.landmarks,
            self.eigen_planes,
            self.landmarks - self.eigen_planes,
            self.factors,
            self.registered_points
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaneGraph {
    poses: Vec<PoseNode>,
    landmarks: Vec<LandmarkNode>,
    factors: Vec<Factor>,
}

impl PlaneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pose node and return its id (ids are assigned in insertion order).
    pub fn add_node_pose_3d(&mut self, initial: SE3, mode: PoseNodeMode) -> PoseId {
        self.poses.push(PoseNode { mode, initial });
        self.poses.len() - 1
    }

    pub fn add_eigen_factor_plane(&mut self, kind: EigenFactorKind) -> LandmarkId {
        self.push_landmark(LandmarkNode::EigenPlane(EigenFactorAccumulator::new(kind)))
    }

    pub fn add_eigen_factor_plane_center(&mut self) -> LandmarkId {
        self.add_eigen_factor_plane(EigenFactorKind::Centered)
    }

    pub fn add_eigen_factor_plane_alternating(&mut self) -> LandmarkId {
        self.add_eigen_factor_plane(EigenFactorKind::Alternating)
    }

    pub fn add_node_plane_4d(&mut self, initial: Vector4<f64>) -> LandmarkId {
        self.push_landmark(LandmarkNode::Plane4d { initial })
    }

    /// Register the points `pose` observed on an eigen-factor landmark.
    pub fn eigen_factor_plane_add_points(
        &mut self,
        landmark: LandmarkId,
        pose: PoseId,
        points: &[Vector3<f64>],
        weight: f64,
    ) -> Result<(), GraphError> {
        self.check_pose(pose)?;
        self.eigen_plane_mut(landmark)?
            .add_points(pose, points, weight);
        self.factors.push(Factor::EigenPoints {
            pose,
            landmark,
            point_count: points.len(),
            weight,
        });
        Ok(())
    }

    /// Add a regularization term to an eigen-factor landmark's cost.
    pub fn add_eigen_factor_regularization(
        &mut self,
        landmark: LandmarkId,
        weight: f64,
    ) -> Result<(), GraphError> {
        self.eigen_plane_mut(landmark)?.add_regularization(weight);
        Ok(())
    }

    pub fn add_pi_factor_plane_4d(
        &mut self,
        scatter: Matrix4<f64>,
        pose: PoseId,
        landmark: LandmarkId,
    ) -> Result<(), GraphError> {
        self.check_pose(pose)?;
        self.check_plane_4d(landmark)?;
        self.factors.push(Factor::PiFactor {
            pose,
            landmark,
            scatter,
        });
        Ok(())
    }

    pub fn add_factor_1pose_1plane_4d(
        &mut self,
        measurement: PlaneEquation,
        pose: PoseId,
        landmark: LandmarkId,
        information: Matrix4<f64>,
    ) -> Result<(), GraphError> {
        self.check_pose(pose)?;
        self.check_plane_4d(landmark)?;
        self.factors.push(Factor::PosePlane4d {
            pose,
            landmark,
            measurement,
            information,
        });
        Ok(())
    }

    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    pub fn poses(&self) -> &[PoseNode] {
        &self.poses
    }

    pub fn pose(&self, pose: PoseId) -> Option<&PoseNode> {
        self.poses.get(pose)
    }

    pub fn landmark(&self, landmark: LandmarkId) -> Option<&LandmarkNode> {
        self.landmarks.get(landmark.0)
    }

    pub fn landmarks(&self) -> impl Iterator<Item = (LandmarkId, &LandmarkNode)> + '_ {
        self.landmarks
            .iter()
            .enumerate()
            .map(|(index, node)| (LandmarkId(index), node))
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Initial estimates of all pose nodes in id order.
    pub fn initial_state(&self) -> Vec<SE3> {
        self.poses.iter().map(|node| node.initial.clone()).collect()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let eigen_planes: Vec<&EigenFactorAccumulator> = self
            .landmarks
            .iter()
            .filter_map(|node| match node {
                LandmarkNode::EigenPlane(accumulator) => Some(accumulator),
                LandmarkNode::Plane4d { .. } => None,
            })
            .collect();
        let registered_points = self
            .factors
            .iter()
            .map(|factor| match factor {
                Factor::EigenPoints { point_count, .. } => *point_count,
                Factor::PiFactor { scatter, .. } => scatter[(3, 3)].round() as usize,
                Factor::PosePlane4d { .. } => 0,
            })
            .sum();

        GraphStatistics {
            poses: self.poses.len(),
            anchors: self
                .poses
                .iter()
                .filter(|node| node.mode == PoseNodeMode::Anchor)
                .count(),
            landmarks: self.landmarks.len(),
            eigen_planes: eigen_planes.len(),
            factors: self.factors.len(),
            registered_points,
        }
    }

    fn push_landmark(&mut self, node: LandmarkNode) -> LandmarkId {
        let id = LandmarkId(self.landmarks.len());
        debug!("Adding landmark {} ({})", id, node.kind_name());
        self.landmarks.push(node);
        id
    }

    fn check_pose(&self, pose: PoseId) -> Result<(), GraphError> {
        if pose < self.poses.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownPose {
                pose,
                pose_count: self.poses.len(),
            })
        }
    }

    fn eigen_plane_mut(
        &mut self,
        landmark: LandmarkId,
    ) -> Result<&mut EigenFactorAccumulator, GraphError> {
        match self.landmarks.get_mut(landmark.0) {
            Some(LandmarkNode::EigenPlane(accumulator)) => Ok(accumulator),
            Some(other) => Err(GraphError::LandmarkKindMismatch {
                landmark,
                expected: "eigen-factor plane",
                actual: other.kind_name(),
            }),
            None => Err(GraphError::UnknownLandmark(landmark)),
        }
    }

    fn check_plane_4d(&self, landmark: LandmarkId) -> Result<(), GraphError> {
        match self.landmarks.get(landmark.0) {
            Some(LandmarkNode::Plane4d { .. }) => Ok(()),
            Some(other) => Err(GraphError::LandmarkKindMismatch {
                landmark,
                expected: "4d plane",
                actual: other.kind_name(),
            }),
            None => Err(GraphError::UnknownLandmark(landmark)),
        }
    }
}
