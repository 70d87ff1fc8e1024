//! Plane-intersection factor backend (`pi-factor`).

use crate::backends::{BackendError, PlaneBackend};
use crate::graph::{LandmarkId, PlaneGraph, PoseId};
use crate::observation::{Observation, PlaneId};
use crate::planes::homogeneous_scatter;
use nalgebra::Vector4;
use tracing::trace;

/// 4D plane landmarks constrained by plane-intersection (π) factors.
///
/// Each observation is summarized by its homogeneous moment matrix S = Σ p̃ p̃ᵀ, so the
/// factor size does not depend on the number of points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PiFactorBackend;

impl PiFactorBackend {
    pub fn initial_plane() -> Vector4<f64> {
        Vector4::new(1.0, 1.0, 1.0, 1.0)
    }
}

impl PlaneBackend for PiFactorBackend {
    fn name(&self) -> &'static str {
        "pi-factor"
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
        graph.add_pi_factor_plane_4d(homogeneous_scatter(points), pose, landmark)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Factor, LandmarkNode, PoseNodeMode};
    use crate::manifold::{LieGroup, SE3};
    use nalgebra::Vector3;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_pi_factor_stores_moment_matrix() -> Result<(), BackendError> {
        let points: Vec<Vector3<f64>> = (0..12)
            .map(|i| Vector3::new((i % 4) as f64, (i / 4) as f64, 3.0))
            .collect();
        let mut observation = Observation::new();
        observation.insert(PlaneId(9), points.clone());

        let mut graph = PlaneGraph::new();
        graph.add_node_pose_3d(SE3::identity(), PoseNodeMode::Anchor);
        let backend = PiFactorBackend;
        let landmark = backend.add_landmark_node(&mut graph);
        backend.register_observation(&mut graph, &observation, 0, PlaneId(9), landmark)?;

        assert!(matches!(
            graph.landmark(landmark),
            Some(LandmarkNode::Plane4d { initial }) if *initial == Vector4::new(1.0, 1.0, 1.0, 1.0)
        ));
        match graph.factors() {
            [Factor::PiFactor { scatter, pose, .. }] => {
                assert_eq!(*pose, 0);
                assert!((scatter - homogeneous_scatter(&points)).norm() < TOLERANCE);
                // plane z = 3 annihilates S
                let plane = Vector4::new(0.0, 0.0, 1.0, -3.0);
                assert!((plane.transpose() * scatter * plane)[(0, 0)].abs() < TOLERANCE);
            }
            other => panic!("unexpected factors {other:?}"),
        }
        Ok(())
    }
}
