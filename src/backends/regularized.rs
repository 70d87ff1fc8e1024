//! Regularized eigen-factor backend (`bareg`).

use crate::backends::eigen_factor::POINT_WEIGHT;
use crate::backends::{BackendError, PlaneBackend};
use crate::graph::{LandmarkId, PlaneGraph, PoseId};
use crate::observation::{Observation, PlaneId};
use tracing::trace;

pub const DEFAULT_REGULARIZATION_WEIGHT: f64 = 1e-3;

/// Centered eigen-factor planes whose cost carries a regularization term per
/// registered observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularizedEigenFactorBackend {
    weight: f64,
}

impl Default for RegularizedEigenFactorBackend {
    fn default() -> Self {
        Self {
            weight: DEFAULT_REGULARIZATION_WEIGHT,
        }
    }
}

impl RegularizedEigenFactorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl PlaneBackend for RegularizedEigenFactorBackend {
    fn name(&self) -> &'static str {
        "bareg"
    }

    fn add_landmark_node(&self, graph: &mut PlaneGraph) -> LandmarkId {
        graph.add_eigen_factor_plane_center()
    }

    fn register_observation(
        &self,
        graph: &mut PlaneGraph,
        observation: &Observation,
        pose: PoseId,
        plane_id: PlaneId,
        landmark: LandmarkId,
    ) -> Result<(), BackendError> {
        let Some(points) = observation.points(plane_id) else {
            trace!("{} not observed from pose {}", plane_id, pose);
            return Ok(());
        };
        graph.eigen_factor_plane_add_points(landmark, pose, points, POINT_WEIGHT)?;
        graph.add_eigen_factor_regularization(landmark, self.weight)?;
        Ok(())
    }
}
