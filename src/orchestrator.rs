//! Pose-graph assembly and solver dispatch.
//!
//! [`PlaneGraphOptimizer::solve`] builds a fresh [`PlaneGraph`] from a sequence of
//! per-frame observations:
//!
//! 1. one pose node per frame, the first one anchored,
//! 2. one landmark per distinct plane id, created by the backend on first sight,
//! 3. one registration per (frame, plane) pair, delegated to the backend,
//!
//! then runs the solver and times the solver call alone.

use crate::backends::{BackendError, BackendKind, PlaneBackend};
use crate::graph::{
    GraphError, GraphSolver, GraphStatistics, LandmarkId, OptimizationMode, PlaneGraph,
    PoseNodeMode, SolverError,
};
use crate::manifold::{LieGroup, SE3};
use crate::observation::{Observation, PlaneId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Configuration of a graph optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptimizationConfig {
    pub backend: BackendKind,
    pub max_iterations: usize,
    pub mode: OptimizationMode,
}

impl Default for GraphOptimizationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            mode: OptimizationMode::default(),
        }
    }
}

impl GraphOptimizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    /// The solver's pose estimates, unchanged
    pub trajectory: Vec<SE3>,
    pub iterations: usize,
    /// Wall-clock time of the solver call
    pub elapsed: Duration,
    pub statistics: GraphStatistics,
}

impl OptimizationOutcome {
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

pub struct PlaneGraphOptimizer<S: GraphSolver> {
    config: GraphOptimizationConfig,
    backend: Box<dyn PlaneBackend>,
    solver: S,
}

impl<S: GraphSolver> PlaneGraphOptimizer<S> {
    pub fn new(config: GraphOptimizationConfig, solver: S) -> Self {
        Self {
            backend: config.backend.create(),
            config,
            solver,
        }
    }

    /// Use a backend that is not part of [`BackendKind`]; `config.backend` is ignored.
    pub fn with_backend(
        config: GraphOptimizationConfig,
        backend: Box<dyn PlaneBackend>,
        solver: S,
    ) -> Self {
        Self {
            config,
            backend,
            solver,
        }
    }

    pub fn config(&self) -> &GraphOptimizationConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Assemble the pose graph without solving it.
    ///
    /// `initial_poses` defaults to identity for every frame.
    pub fn build_graph(
        &self,
        observations: &[Observation],
        initial_poses: Option<&[SE3]>,
    ) -> Result<PlaneGraph, OptimizationError> {
        let mut graph = PlaneGraph::new();

        match initial_poses {
            Some(poses) => {
                if poses.len() != observations.len() {
                    return Err(GraphError::PoseCountMismatch {
                        poses: poses.len(),
                        observations: observations.len(),
                    }
                    .into());
                }
                for (index, pose) in poses.iter().enumerate() {
                    graph.add_node_pose_3d(pose.clone(), node_mode(index));
                }
            }
            None => {
                for index in 0..observations.len() {
                    graph.add_node_pose_3d(SE3::identity(), node_mode(index));
                }
            }
        }

        let mut landmarks: BTreeMap<PlaneId, LandmarkId> = BTreeMap::new();
        for (pose, observation) in observations.iter().enumerate() {
            for plane_id in observation.plane_ids() {
                let landmark = *landmarks
                    .entry(plane_id)
                    .or_insert_with(|| self.backend.add_landmark_node(&mut graph));
                self.backend
                    .register_observation(&mut graph, observation, pose, plane_id, landmark)?;
            }
        }

        debug!("{}", graph.statistics());
        Ok(graph)
    }

    /// Build the graph, run the solver and report its estimate.
    pub fn solve(
        &mut self,
        observations: &[Observation],
        initial_poses: Option<&[SE3]>,
    ) -> Result<OptimizationOutcome, OptimizationError> {
        let graph = self.build_graph(observations, initial_poses)?;
        let statistics = graph.statistics();
        info!(
            "Solving {} poses and {} planes with backend '{}' ({}, max {} iterations)",
            statistics.poses,
            statistics.landmarks,
            self.backend.name(),
            self.config.mode,
            self.config.max_iterations
        );

        let start = Instant::now();
        let iterations = self
            .solver
            .solve(&graph, self.config.mode, self.config.max_iterations)?;
        let elapsed = start.elapsed();

        info!(
            "Solver finished after {} iterations in {:.3} ms",
            iterations,
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(OptimizationOutcome {
            trajectory: self.solver.estimated_state(),
            iterations,
            elapsed,
            statistics,
        })
    }
}

fn node_mode(index: usize) -> PoseNodeMode {
    if index == 0 {
        PoseNodeMode::Anchor
    } else {
        PoseNodeMode::Standard
    }
}
