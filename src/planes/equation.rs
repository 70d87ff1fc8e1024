//! Plane equations in Hessian normal form.

use crate::manifold::{LieGroup, SE3};
use nalgebra::{Vector3, Vector4};
use std::fmt;

/// Plane n·x + d = 0 with a unit normal and the sign convention d ≥ 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneEquation {
    coeffs: Vector4<f64>,
}

impl PlaneEquation {
    /// Build a plane from a normal and an offset.
    ///
    /// The normal is normalized and the pair is flipped when needed so that the
    /// offset is non-negative. Returns `None` for a zero or non-finite normal.
    pub fn new(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm < f64::EPSILON || !offset.is_finite() {
            return None;
        }
        let normal = normal / norm;
        let offset = offset / norm;
        Some(Self::canonical(normal, offset))
    }

    /// Plane from raw coefficients [nx, ny, nz, d], normalized and canonicalized.
    pub fn from_coeffs(coeffs: Vector4<f64>) -> Option<Self> {
        Self::new(coeffs.xyz(), coeffs.w)
    }

    fn canonical(normal: Vector3<f64>, offset: f64) -> Self {
        let sign = if offset < 0.0 { -1.0 } else { 1.0 };
        let normal = normal * sign;
        PlaneEquation {
            coeffs: Vector4::new(normal.x, normal.y, normal.z, offset * sign),
        }
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.coeffs.xyz()
    }

    pub fn offset(&self) -> f64 {
        self.coeffs.w
    }

    /// Coefficients [nx, ny, nz, d].
    pub fn coeffs(&self) -> Vector4<f64> {
        self.coeffs
    }

    /// Signed distance of a point to the plane.
    pub fn signed_distance(&self, point: &Vector3<f64>) -> f64 {
        self.normal().dot(point) + self.offset()
    }

    /// Re-express the plane in another frame.
    ///
    /// `pose` maps points of the plane's current frame into the target frame
    /// (x' = R x + t), so the plane transforms as n' = R n, d' = d - n'·t.
    pub fn transform(&self, pose: &SE3) -> Self {
        let normal = pose.rotation_so3().act(&self.normal());
        let offset = self.offset() - normal.dot(&pose.translation());
        Self::canonical(normal, offset)
    }
}

impl fmt::Display for PlaneEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plane(n: [{:.4}, {:.4}, {:.4}], d: {:.4})",
            self.coeffs.x, self.coeffs.y, self.coeffs.z, self.coeffs.w
        )
    }
}
