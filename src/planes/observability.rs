//! Degeneracy check for plane-based pose estimation.
//!
//! A pose is only constrained in all directions when the observed plane normals span
//! R³. The check scales the eigenvectors of the normals' Gram matrix by their
//! eigenvalues and thresholds the absolute determinant of the result.

use crate::planes::PlaneEquation;
use nalgebra::{Matrix3, MatrixXx3};
use tracing::debug;

/// Default threshold on |det| above which a plane set is considered well spread.
pub const DEFAULT_DETERMINANT_THRESHOLD: f64 = 0.1;

/// Observability gate over a set of plane normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnoughPlanesDetector {
    threshold: f64,
}

impl Default for EnoughPlanesDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DETERMINANT_THRESHOLD,
        }
    }
}

impl EnoughPlanesDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True when the normals of `planes` span space well enough: |det| > threshold.
    pub fn has_enough_planes(&self, planes: &[PlaneEquation]) -> bool {
        normals_determinant(planes).abs() > self.threshold
    }
}

/// det(V · diag(λ)) where (V, λ) is the eigendecomposition of NᵀN.
///
/// N stacks one normal per row. The value is zero whenever the normals do not span R³.
pub fn normals_determinant(planes: &[PlaneEquation]) -> f64 {
    let normals = MatrixXx3::from_fn(planes.len(), |row, col| planes[row].normal()[col]);
    let gram: Matrix3<f64> = normals.transpose() * &normals;

    let eigen = gram.symmetric_eigen();
    let mut scaled = eigen.eigenvectors;
    for (mut column, eigenvalue) in scaled.column_iter_mut().zip(eigen.eigenvalues.iter()) {
        column *= *eigenvalue;
    }
    let det = scaled.determinant();
    debug!("Plane normals determinant: {det:.6} over {} planes", planes.len());
    det
}

/// Convenience wrapper using the default threshold.
pub fn has_enough_planes(planes: &[PlaneEquation]) -> bool {
    EnoughPlanesDetector::default().has_enough_planes(planes)
}
