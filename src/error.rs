//! Error types for the planeslam-eval library
//!
//! Every module reports failures through its own `thiserror` enum. This module
//! aggregates them into [`PlaneEvalError`] so binaries and callers combining several
//! stages can use a single result type with `?`.

use crate::{
    backends::BackendError,
    camera::CameraError,
    extraction::ExtractionError,
    graph::{GraphError, SolverError},
    io::IoError,
    manifold::ManifoldError,
    metrics::MetricsError,
    orchestrator::OptimizationError,
    planes::FittingError,
};
use thiserror::Error;

/// Main result type used throughout the planeslam-eval library
pub type PlaneEvalResult<T> = Result<T, PlaneEvalError>;

/// Main error type for the planeslam-eval library
#[derive(Debug, Error)]
pub enum PlaneEvalError {
    /// Plane fitting failures (too few or degenerate points)
    #[error("Plane fitting error: {0}")]
    Fitting(#[from] FittingError),

    /// Plane extraction from labeled clouds
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Camera intrinsics and depth back-projection
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    /// Manifold operations errors
    #[error("Manifold error: {0}")]
    Manifold(#[from] ManifoldError),

    /// Backend selection and registration
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Pose graph construction
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Failures reported by the external solver
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Trajectory metrics
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Trajectory file reading and writing
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for PlaneEvalError {
    fn from(err: std::io::Error) -> Self {
        PlaneEvalError::Io(IoError::Io(err))
    }
}

impl From<OptimizationError> for PlaneEvalError {
    fn from(err: OptimizationError) -> Self {
        match err {
            OptimizationError::Graph(e) => PlaneEvalError::Graph(e),
            OptimizationError::Backend(e) => PlaneEvalError::Backend(e),
            OptimizationError::Solver(e) => PlaneEvalError::Solver(e),
        }
    }
}
