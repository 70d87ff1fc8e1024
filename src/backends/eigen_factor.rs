//! Eigen-factor backends (`ef-centered`, `ef`).

use crate::backends::{BackendError, PlaneBackend};
use crate::graph::{EigenFactorKind, LandmarkId, PlaneGraph, PoseId};
use crate::observation::{Observation, PlaneId};
use tracing::trace;

/// Weight of every registered point cluster.
pub const POINT_WEIGHT: f64 = 1.0;

/// Eigen-factor planes fed with the raw points of each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EigenFactorBackend {
    kind: EigenFactorKind,
}

impl EigenFactorBackend {
    pub fn new(kind: EigenFactorKind) -> Self {
        Self { kind }
    }

    pub fn centered() -> Self {
        Self::new(EigenFactorKind::Centered)
    }

    pub fn alternating() -> Self {
        Self::new(EigenFactorKind::Alternating)
    }

    pub fn kind(&self) -> EigenFactorKind {
        self.kind
    }
}

impl PlaneBackend for EigenFactorBackend {
    fn name(&self) -> &'static str {
        match self.kind {
            EigenFactorKind::Centered => "ef-centered",
            EigenFactorKind::Alternating => "ef",
        }
    }

    fn add_landmark_node(&self, graph: &mut PlaneGraph) -> LandmarkId {
        graph.add_eigen_factor_plane(self.kind)
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
        Ok(())
    }
}
