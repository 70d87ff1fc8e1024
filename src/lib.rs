pub mod backends;
pub mod camera;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod io;
pub mod logger;
pub mod manifold;
pub mod metrics;
pub mod observation;
pub mod orchestrator;
pub mod perturbation;
pub mod planes;
pub mod synthetic;

pub use backends::{BackendError, BackendKind, PlaneBackend, create_backend};
pub use error::{PlaneEvalError, PlaneEvalResult};
pub use logger::{init_logger, init_logger_with_level};
pub use metrics::{MetricsError, PoseError, ape, rpe};
pub use observation::{LabelColor, Observation, PlaneId};
pub use orchestrator::{
    GraphOptimizationConfig, OptimizationError, OptimizationOutcome, PlaneGraphOptimizer,
};
