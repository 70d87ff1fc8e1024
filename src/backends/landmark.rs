//! 4D plane landmark backend (`landmark`).

use crate::backends::{BackendError, PlaneBackend};
use crate::graph::{LandmarkId, PlaneGraph, PoseId};
use crate::observation::{Observation, PlaneId};
use crate::planes::fit_plane;
use nalgebra::{Matrix4, Vector4};
use tracing::trace;

/// 4D plane landmarks measured by the plane fitted to each frame's points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandmarkBackend;

impl LandmarkBackend {
    pub fn initial_plane() -> Vector4<f64> {
        Vector4::new(1.0, 0.0, 0.0, 0.0)
    }
}

impl PlaneBackend for LandmarkBackend {
    fn name(&self) -> &'static str {
        "landmark"
    }

    fn add_landmark_node(&self, graph: &mut PlaneGraph) -> LandmarkId {
        graph.add_node_plane_4d(Self::initial_plane())
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
        let measurement =
            fit_plane(points).map_err(|source| BackendError::Fitting { plane_id, source })?;
        graph.add_factor_1pose_1plane_4d(measurement, pose, landmark, Matrix4::identity())?;
        Ok(())
    }
}
