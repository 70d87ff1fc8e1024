//! Shared utilities for pipeline integration tests
//!
//! Provides deterministic planar point sets and solver doubles that record the graph
//! they were handed.

#![allow(dead_code)]

use nalgebra::Vector3;
use planeslam_eval::graph::{
    Factor, GraphSolver, GraphStatistics, OptimizationMode, PlaneGraph, PoseNodeMode,
    SolverError,
};
use planeslam_eval::manifold::SE3;
use planeslam_eval::observation::{Observation, PlaneId};

/// `count` points on the plane n·x + d = 0 laid out on a slightly irregular grid.
pub fn plane_points(normal: Vector3<f64>, offset: f64, count: usize) -> Vec<Vector3<f64>> {
    let normal = normal.normalize();
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    let origin = -normal * offset;
    let side = (count as f64).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let a = (i % side) as f64 * 0.05 + 0.01 * ((i * 7) % 5) as f64;
            let b = (i / side) as f64 * 0.05 + 0.01 * ((i * 3) % 7) as f64;
            origin + u * (a - 1.0) + v * (b - 1.0)
        })
        .collect()
}

/// Observation holding the given planes, each with `count` points.
pub fn observation_of(planes: &[(u32, Vector3<f64>, f64)], count: usize) -> Observation {
    planes
        .iter()
        .map(|&(id, normal, offset)| (PlaneId(id), plane_points(normal, offset, count)))
        .collect()
}

/// What a solver was handed.
#[derive(Debug, Clone)]
pub struct SeenGraph {
    pub statistics: GraphStatistics,
    pub pose_modes: Vec<PoseNodeMode>,
    pub initial_state: Vec<SE3>,
    pub factors: Vec<Factor>,
    pub mode: OptimizationMode,
    pub max_iterations: usize,
}

/// Solver double: records the graph and returns a scripted estimate.
#[derive(Debug, Default)]
pub struct RecordingSolver {
    pub scripted_state: Option<Vec<SE3>>,
    pub scripted_iterations: usize,
    pub seen: Option<SeenGraph>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(state: Vec<SE3>, iterations: usize) -> Self {
        Self {
            scripted_state: Some(state),
            scripted_iterations: iterations,
            seen: None,
        }
    }
}

impl GraphSolver for RecordingSolver {
    fn solve(
        &mut self,
        graph: &PlaneGraph,
        mode: OptimizationMode,
        max_iterations: usize,
    ) -> Result<usize, SolverError> {
        self.seen = Some(SeenGraph {
            statistics: graph.statistics(),
            pose_modes: graph.poses().iter().map(|node| node.mode).collect(),
            initial_state: graph.initial_state(),
            factors: graph.factors().to_vec(),
            mode,
            max_iterations,
        });
        Ok(self.scripted_iterations)
    }

    fn estimated_state(&self) -> Vec<SE3> {
        match (&self.scripted_state, &self.seen) {
            (Some(state), _) => state.clone(),
            (None, Some(seen)) => seen.initial_state.clone(),
            (None, None) => Vec::new(),
        }
    }
}

/// Solver double that always fails.
pub struct FailingSolver(pub SolverError);

impl GraphSolver for FailingSolver {
    fn solve(
        &mut self,
        _graph: &PlaneGraph,
        _mode: OptimizationMode,
        _max_iterations: usize,
    ) -> Result<usize, SolverError> {
        Err(self.0.clone())
    }

    fn estimated_state(&self) -> Vec<SE3> {
        Vec::new()
    }
}
