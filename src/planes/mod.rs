//! Plane geometry: equations, least-squares fitting and the observability gate.

pub mod equation;
pub mod fitting;
pub mod observability;

pub use equation::PlaneEquation;
pub use fitting::{
    FittingError, MIN_PLANE_POINTS, PlaneFit, fit_plane, fit_plane_detailed,
    homogeneous_scatter,
};
pub use observability::{EnoughPlanesDetector, has_enough_planes, normals_determinant};
