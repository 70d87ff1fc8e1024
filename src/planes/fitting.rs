//! Least-squares plane fitting.
//!
//! The plane normal is the eigenvector of the centered scatter matrix AᵀA with the
//! smallest eigenvalue, which minimizes the sum of squared orthogonal distances.

use crate::planes::PlaneEquation;
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use thiserror::Error;

/// Minimum number of points a plane can be fitted to.
pub const MIN_PLANE_POINTS: usize = 3;

/// Relative eigenvalue ratio below which the scatter matrix is treated as rank-deficient.
const RANK_THRESHOLD: f64 = 1e-10;

/// Errors raised by the plane fitter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FittingError {
    #[error("Insufficient points: got {got}, need at least {MIN_PLANE_POINTS}")]
    InsufficientPoints { got: usize },

    #[error("Degenerate point set: {0}")]
    Degenerate(String),
}

/// Plane fitted to a point set together with its quality.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneFit {
    pub equation: PlaneEquation,
    pub centroid: Vector3<f64>,
    /// RMS orthogonal distance of the points to the fitted plane
    pub rms_residual: f64,
    /// Eigenvalues of the centered scatter matrix, ascending
    pub eigenvalues: Vector3<f64>,
}

/// Fit a plane to `points` and return its canonical equation (d ≥ 0).
pub fn fit_plane(points: &[Vector3<f64>]) -> Result<PlaneEquation, FittingError> {
    fit_plane_detailed(points).map(|fit| fit.equation)
}

/// Fit a plane to `points`, also reporting the centroid, residual and spectrum.
pub fn fit_plane_detailed(points: &[Vector3<f64>]) -> Result<PlaneFit, FittingError> {
    if points.len() < MIN_PLANE_POINTS {
        return Err(FittingError::InsufficientPoints { got: points.len() });
    }
    let n = points.len() as f64;

    let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p) / n;

    let scatter = points.iter().fold(Matrix3::zeros(), |acc, p| {
        let centered = p - centroid;
        acc + centered * centered.transpose()
    });

    let eigen = scatter.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let eigenvalues = Vector3::new(
        eigen.eigenvalues[order[0]],
        eigen.eigenvalues[order[1]],
        eigen.eigenvalues[order[2]],
    );

    if !eigenvalues.iter().all(|v| v.is_finite()) {
        return Err(FittingError::Degenerate(
            "scatter matrix has non-finite eigenvalues".to_string(),
        ));
    }

    // A plane needs two significant directions of spread
    let max_eigenvalue = eigenvalues[2];
    if max_eigenvalue <= f64::EPSILON {
        return Err(FittingError::Degenerate(
            "all points coincide".to_string(),
        ));
    }
    if eigenvalues[1] / max_eigenvalue < RANK_THRESHOLD {
        return Err(FittingError::Degenerate(
            "points are collinear".to_string(),
        ));
    }

    let normal: Vector3<f64> = eigen.eigenvectors.column(order[0]).into_owned();
    let offset = -normal.dot(&centroid);
    let equation = PlaneEquation::new(normal, offset).ok_or_else(|| {
        FittingError::Degenerate("eigenvector of the smallest eigenvalue is zero".to_string())
    })?;

    let sum_sq: f64 = points
        .iter()
        .map(|p| equation.signed_distance(p).powi(2))
        .sum();

    Ok(PlaneFit {
        equation,
        centroid,
        rms_residual: (sum_sq / n).sqrt(),
        eigenvalues,
    })
}

/// Homogeneous second-moment matrix S = Σ p̃ p̃ᵀ with p̃ = [p; 1].
///
/// This is the sufficient statistic of a point cluster for plane factors: for any
/// plane π = [n; d], πᵀ S π is the sum of squared point-to-plane distances.
pub fn homogeneous_scatter(points: &[Vector3<f64>]) -> Matrix4<f64> {
    points.iter().fold(Matrix4::zeros(), |acc, p| {
        let homogeneous = Vector4::new(p.x, p.y, p.z, 1.0);
        acc + homogeneous * homogeneous.transpose()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn points_on_plane(normal: Vector3<f64>, offset: f64, count: usize) -> Vec<Vector3<f64>> {
        let normal = normal.normalize();
        let helper = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = normal.cross(&helper).normalize();
        let v = normal.cross(&u);
        let origin = -offset * normal;
        (0..count)
            .map(|i| {
                let a = (i as f64 * 0.37).sin() * 2.0;
                let b = (i as f64 * 0.11).cos() * 3.0 + i as f64 * 0.001;
                origin + a * u + b * v
            })
            .collect()
    }

    #[test]
    fn test_fit_recovers_known_plane() -> Result<(), FittingError> {
        let normal = Vector3::new(0.2, -0.5, 0.8).normalize();
        let points = points_on_plane(normal, 1.7, 200);
        let plane = fit_plane(&points)?;

        assert!((plane.normal() - normal).norm() < TOLERANCE);
        assert!((plane.offset() - 1.7).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_fit_canonicalizes_negative_offset() -> Result<(), FittingError> {
        let normal = Vector3::new(0.0, 1.0, 0.0);
        // n·x - 2 = 0 is the same plane as -n·x + 2 = 0
        let points = points_on_plane(normal, -2.0, 50);
        let plane = fit_plane(&points)?;

        assert!((plane.normal() + normal).norm() < TOLERANCE);
        assert!((plane.offset() - 2.0).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_fit_reports_residual() -> Result<(), FittingError> {
        let mut points = points_on_plane(Vector3::z(), 1.0, 100);
        for (i, p) in points.iter_mut().enumerate() {
            p.z += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        let fit = fit_plane_detailed(&points)?;
        assert!((fit.rms_residual - 0.01).abs() < 1e-3);
        assert!(fit.eigenvalues[0] <= fit.eigenvalues[1]);
        Ok(())
    }

    #[test]
    fn test_fit_rejects_too_few_points() {
        let points = vec![Vector3::zeros(), Vector3::x()];
        assert_eq!(
            fit_plane(&points),
            Err(FittingError::InsufficientPoints { got: 2 })
        );
    }

    #[test]
    fn test_fit_rejects_collinear_points() {
        let points: Vec<_> = (0..20)
            .map(|i| Vector3::new(i as f64, 2.0 * i as f64, -(i as f64)))
            .collect();
        assert!(matches!(
            fit_plane(&points),
            Err(FittingError::Degenerate(_))
        ));
    }

    #[test]
    fn test_fit_rejects_coincident_points() {
        let points = vec![Vector3::new(1.0, 1.0, 1.0); 10];
        assert!(matches!(
            fit_plane(&points),
            Err(FittingError::Degenerate(_))
        ));
    }

    #[test]
    fn test_homogeneous_scatter_measures_plane_distance() {
        let points = points_on_plane(Vector3::new(1.0, 0.0, 0.0), 0.5, 30);
        let scatter = homogeneous_scatter(&points);
        let plane = Vector4::new(1.0, 0.0, 0.0, 0.5);
        assert!((plane.transpose() * scatter * plane)[(0, 0)].abs() < TOLERANCE);
        assert!((scatter[(3, 3)] - 30.0).abs() < TOLERANCE);
    }
}
