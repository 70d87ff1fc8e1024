//! Plane parameterization backends.
//!
//! A backend decides how a plane seen in a frame enters the pose graph: which landmark
//! node represents the plane and which factor(s) link a pose to it.
//!
//! | Key           | Landmark node                    | Registration                         |
//! |---------------|----------------------------------|--------------------------------------|
//! | `ef-centered` | eigen-factor plane, centered     | raw points, weight 1                 |
//! | `ef`          | eigen-factor plane, alternating  | raw points, weight 1                 |
//! | `pi-factor`   | 4D plane, init (1, 1, 1, 1)      | π-factor from S = Σ p̃ p̃ᵀ             |
//! | `landmark`    | 4D plane, init (1, 0, 0, 0)      | fitted plane, identity information   |
//! | `bareg`       | eigen-factor plane, centered     | raw points plus a regularization term |

use crate::graph::{GraphError, LandmarkId, PlaneGraph, PoseId};
use crate::observation::{Observation, PlaneId};
use crate::planes::FittingError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod eigen_factor;
pub mod landmark;
pub mod pi_factor;
pub mod regularized;

pub use eigen_factor::EigenFactorBackend;
pub use landmark::LandmarkBackend;
pub use pi_factor::PiFactorBackend;
pub use regularized::{DEFAULT_REGULARIZATION_WEIGHT, RegularizedEigenFactorBackend};

/// Errors raised by the backends
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Unknown backend '{0}' (expected one of: ef, ef-centered, bareg, pi-factor, landmark)")]
    UnknownBackend(String),

    #[error("Failed to fit {plane_id}: {source}")]
    Fitting {
        plane_id: PlaneId,
        #[source]
        source: FittingError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Strategy turning plane observations into landmark nodes and factors.
pub trait PlaneBackend {
    /// Short identifier, equal to the factory key.
    fn name(&self) -> &'static str;

    /// Create the landmark node for a plane seen for the first time.
    fn add_landmark_node(&self, graph: &mut PlaneGraph) -> LandmarkId;

    /// Link `pose` to `landmark` using the points of `plane_id` in `observation`.
    ///
    /// A plane missing from the observation adds nothing.
    fn register_observation(
        &self,
        graph: &mut PlaneGraph,
        observation: &Observation,
        pose: PoseId,
        plane_id: PlaneId,
        landmark: LandmarkId,
    ) -> Result<(), BackendError>;
}

impl<B: PlaneBackend + ?Sized> PlaneBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn add_landmark_node(&self, graph: &mut PlaneGraph) -> LandmarkId {
        (**self).add_landmark_node(graph)
    }

    fn register_observation(
        &self,
        graph: &mut PlaneGraph,
        observation: &Observation,
        pose: PoseId,
        plane_id: PlaneId,
        landmark: LandmarkId,
    ) -> Result<(), BackendError> {
        (**self).register_observation(graph, observation, pose, plane_id, landmark)
    }
}

/// The available backends, selected by factory key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    #[default]
    EigenFactorCentered,
    EigenFactorAlternating,
    PiFactor,
    Landmark,
    Regularized,
}

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::EigenFactorAlternating,
        BackendKind::EigenFactorCentered,
        BackendKind::Regularized,
        BackendKind::PiFactor,
        BackendKind::Landmark,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BackendKind::EigenFactorCentered => "ef-centered",
            BackendKind::EigenFactorAlternating => "ef",
            BackendKind::PiFactor => "pi-factor",
            BackendKind::Landmark => "landmark",
            BackendKind::Regularized => "bareg",
        }
    }

    pub fn create(&self) -> Box<dyn PlaneBackend> {
        match self {
            BackendKind::EigenFactorCentered => Box::new(EigenFactorBackend::centered()),
            BackendKind::EigenFactorAlternating => Box::new(EigenFactorBackend::alternating()),
            BackendKind::PiFactor => Box::new(PiFactorBackend),
            BackendKind::Landmark => Box::new(LandmarkBackend),
            BackendKind::Regularized => Box::new(RegularizedEigenFactorBackend::default()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| BackendError::UnknownBackend(s.to_string()))
    }
}

/// Build a backend from its factory key.
pub fn create_backend(key: &str) -> Result<Box<dyn PlaneBackend>, BackendError> {
    Ok(key.parse::<BackendKind>()?.create())
}
