//! Boundary to the nonlinear least-squares solver.

use crate::graph::PlaneGraph;
use crate::manifold::SE3;
use std::fmt;
use thiserror::Error;

/// Errors reported by a solver implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Solver failed: {0}")]
    Failed(String),

    #[error("Graph rejected by solver: {0}")]
    InvalidGraph(String),

    #[error("Numerical failure after {iterations} iterations: {message}")]
    NumericalFailure { iterations: usize, message: String },
}

/// Iteration scheme requested from the solver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationMode {
    /// Levenberg-Marquardt with damping scaled by the diagonal of the Hessian
    #[default]
    LevenbergMarquardtEllipsoid,
    /// Levenberg-Marquardt with isotropic damping
    LevenbergMarquardtSphere,
    GaussNewton,
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationMode::LevenbergMarquardtEllipsoid => {
                write!(f, "Levenberg-Marquardt (ellipsoid)")
            }
            OptimizationMode::LevenbergMarquardtSphere => write!(f, "Levenberg-Marquardt (sphere)"),
            OptimizationMode::GaussNewton => write!(f, "Gauss-Newton"),
        }
    }
}

/// A nonlinear least-squares solver over a [`PlaneGraph`].
pub trait GraphSolver {
    /// Optimize `graph` for at most `max_iterations` and return the iterations used.
    fn solve(
        &mut self,
        graph: &PlaneGraph,
        mode: OptimizationMode,
        max_iterations: usize,
    ) -> Result<usize, SolverError>;

    /// Pose estimates of the last successful solve, in pose id order.
    fn estimated_state(&self) -> Vec<SE3>;
}

/// Solver that performs no iterations and reports the graph's initial poses.
///
/// Serves as the zero-optimization baseline and as a dry run of graph assembly.
#[derive(Debug, Clone, Default)]
pub struct InitialGuessSolver {
    state: Vec<SE3>,
}

impl InitialGuessSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphSolver for InitialGuessSolver {
    fn solve(
        &mut self,
        graph: &PlaneGraph,
        _mode: OptimizationMode,
        _max_iterations: usize,
    ) -> Result<usize, SolverError> {
        self.state = graph.initial_state();
        Ok(0)
    }

    fn estimated_state(&self) -> Vec<SE3> {
        self.state.clone()
    }
}

impl<S: GraphSolver + ?Sized> GraphSolver for Box<S> {
    fn solve(
        &mut self,
        graph: &PlaneGraph,
        mode: OptimizationMode,
        max_iterations: usize,
    ) -> Result<usize, SolverError> {
        (**self).solve(graph, mode, max_iterations)
    }

    fn estimated_state(&self) -> Vec<SE3> {
        (**self).estimated_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PoseNodeMode;
    use crate::manifold::LieGroup;

    #[test]
    fn test_initial_guess_solver_returns_initial_poses() -> Result<(), SolverError> {
        let mut graph = PlaneGraph::new();
        let second = SE3::from_translation_euler(0.5, 0.0, 0.0, 0.0, 0.0, 0.2);
        graph.add_node_pose_3d(SE3::identity(), PoseNodeMode::Anchor);
        graph.add_node_pose_3d(second.clone(), PoseNodeMode::Standard);

        let mut solver = InitialGuessSolver::new();
        assert!(solver.estimated_state().is_empty());
        let iterations = solver.solve(&graph, OptimizationMode::default(), 50)?;

        assert_eq!(iterations, 0);
        assert_eq!(solver.estimated_state(), vec![SE3::identity(), second]);
        Ok(())
    }

    #[test]
    fn test_boxed_solver_delegates() -> Result<(), SolverError> {
        let mut graph = PlaneGraph::new();
        graph.add_node_pose_3d(SE3::identity(), PoseNodeMode::Anchor);
        let mut solver: Box<dyn GraphSolver> = Box::new(InitialGuessSolver::new());
        solver.solve(&graph, OptimizationMode::GaussNewton, 1)?;
        assert_eq!(solver.estimated_state().len(), 1);
        Ok(())
    }

    #[test]
    fn test_default_mode_is_ellipsoidal_lm() {
        assert_eq!(
            OptimizationMode::default(),
            OptimizationMode::LevenbergMarquardtEllipsoid
        );
    }
}
