//! SO(3) - Special Orthogonal Group in 3D
//!
//! SO(3) elements are represented using nalgebra's UnitQuaternion internally.
//! SO(3) tangent elements are axis-angle vectors in R³, where the direction gives
//! the axis of rotation and the magnitude gives the angle.
//!
//! The geodesic distance between two rotations is the norm of the logarithm of the
//! relative rotation; it is what the rotation part of APE/RPE aggregates.

use crate::manifold::{LieGroup, ManifoldError, ManifoldResult, Tangent};
use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion, Vector3};

/// SO(3) group element representing rotations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    quaternion: UnitQuaternion<f64>,
}

/// SO(3) tangent space element: axis-angle vector [θx, θy, θz].
#[derive(Clone, Debug, PartialEq)]
pub struct SO3Tangent {
    data: Vector3<f64>,
}

impl SO3 {
    /// Create a new SO(3) element from a unit quaternion.
    pub fn new(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Create SO(3) from a 3x3 matrix, checking orthonormality and det = +1.
    pub fn from_matrix(matrix: &Matrix3<f64>, tolerance: f64) -> ManifoldResult<Self> {
        let orthogonality = (matrix.transpose() * matrix - Matrix3::identity()).norm();
        if !orthogonality.is_finite() || orthogonality > tolerance {
            return Err(ManifoldError::SingularTransform(format!(
                "rotation block is not orthonormal (‖RᵀR - I‖ = {orthogonality:.3e})"
            )));
        }
        let det = matrix.determinant();
        if (det - 1.0).abs() > tolerance {
            return Err(ManifoldError::SingularTransform(format!(
                "rotation block has determinant {det:.6}, expected +1"
            )));
        }
        let rotation = Rotation3::from_matrix_unchecked(*matrix);
        Ok(SO3 {
            quaternion: UnitQuaternion::from_rotation_matrix(&rotation),
        })
    }

    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }

    /// # Equation 133: Logarithmic map for unit quaternions (S³)
    /// θu = Log(q) = (2 / ||v||) * v * arctan(||v||, w) ∈ R³
    pub fn log(&self) -> SO3Tangent {
        let q = self.quaternion.quaternion();
        let sin_angle_squared = q.i * q.i + q.j * q.j + q.k * q.k;

        let log_coeff = if sin_angle_squared > f64::EPSILON {
            let sin_angle = sin_angle_squared.sqrt();
            let cos_angle = q.w;

            // q and -q are the same rotation; pick the branch giving an angle in [0, π]
            let two_angle = 2.0
                * if cos_angle < 0.0 {
                    f64::atan2(-sin_angle, -cos_angle)
                } else {
                    f64::atan2(sin_angle, cos_angle)
                };

            two_angle / sin_angle
        } else {
            2.0
        };

        SO3Tangent::new(Vector3::new(
            q.i * log_coeff,
            q.j * log_coeff,
            q.k * log_coeff,
        ))
    }

    /// Geodesic angle of this rotation, in radians within [0, π].
    pub fn angle(&self) -> f64 {
        self.log().angle()
    }
}

impl LieGroup for SO3 {
    type Matrix = Matrix3<f64>;

    fn identity() -> Self {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    fn inverse(&self) -> Self {
        SO3 {
            quaternion: self.quaternion.inverse(),
        }
    }

    fn compose(&self, other: &Self) -> Self {
        SO3 {
            quaternion: self.quaternion * other.quaternion,
        }
    }

    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * vector
    }

    fn matrix(&self) -> Matrix3<f64> {
        self.rotation_matrix()
    }
}

impl SO3Tangent {
    pub fn new(axis_angle: Vector3<f64>) -> Self {
        SO3Tangent { data: axis_angle }
    }

    pub fn axis_angle(&self) -> Vector3<f64> {
        self.data
    }

    /// Get the angle of rotation.
    pub fn angle(&self) -> f64 {
        self.data.norm()
    }

    /// Left Jacobian Jl of the SO(3) exponential.
    ///
    /// # Equation 144
    /// J_l(θ) = I + (1 - cos θ)/θ² [θ]ₓ + (θ - sin θ)/θ³ [θ]ₓ²
    ///
    /// Needed by the SE(3) exponential to map ρ to the translation.
    pub fn left_jacobian(&self) -> Matrix3<f64> {
        let angle = self.data.norm_squared();
        let tangent_skew = self.hat();

        if angle <= f64::EPSILON {
            Matrix3::identity() + 0.5 * tangent_skew
        } else {
            let theta = angle.sqrt();
            let sin_theta = theta.sin();
            let cos_theta = theta.cos();

            Matrix3::identity()
                + (1.0 - cos_theta) / angle * tangent_skew
                + (theta - sin_theta) / (angle * theta) * tangent_skew * tangent_skew
        }
    }

    /// [θ]ₓ = [0 -θz θy; θz 0 -θx; -θy θx 0]
    fn hat(&self) -> Matrix3<f64> {
        Matrix3::new(
            0.0,
            -self.data.z,
            self.data.y,
            self.data.z,
            0.0,
            -self.data.x,
            -self.data.y,
            self.data.x,
            0.0,
        )
    }
}

impl Tangent<SO3> for SO3Tangent {
    /// # Equation 132: Exponential map for unit quaternions (S³)
    /// q = Exp(θu) = cos(θ/2) + u sin(θ/2) ∈ H
    fn exp(&self) -> SO3 {
        let theta_squared = self.data.norm_squared();

        let quaternion = if theta_squared > f64::EPSILON {
            UnitQuaternion::from_scaled_axis(self.data)
        } else {
            UnitQuaternion::from_quaternion(Quaternion::new(
                1.0,
                self.data.x / 2.0,
                self.data.y / 2.0,
                self.data.z / 2.0,
            ))
        };

        SO3 { quaternion }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    fn rotation_about(axis_angle: Vector3<f64>) -> SO3 {
        SO3Tangent::new(axis_angle).exp()
    }

    #[test]
    fn test_so3_identity() {
        let so3 = SO3::identity();
        assert_eq!(so3.quaternion(), UnitQuaternion::identity());
        assert_eq!(so3.angle(), 0.0);
    }

    #[test]
    fn test_so3_exp_log() {
        let tangent = SO3Tangent::new(Vector3::new(0.3, -0.2, 0.5));
        let recovered = tangent.exp().log();
        assert!((recovered.axis_angle() - tangent.axis_angle()).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_small_angle_exp() {
        let tangent = SO3Tangent::new(Vector3::new(1e-9, 0.0, 0.0));
        let rotation = tangent.exp();
        assert!((rotation.angle() - 1e-9).abs() < TOLERANCE);
    }

    #[test]
    fn test_so3_log_near_pi_is_bounded() {
        let rotation = rotation_about(Vector3::new(0.0, 0.0, PI - 1e-9));
        assert!(rotation.angle() <= PI + TOLERANCE);

        // A quaternion with negative w encodes the same rotation as its negation
        let flipped = SO3::new(UnitQuaternion::new_unchecked(-rotation.quaternion().into_inner()));
        assert!((flipped.angle() - rotation.angle()).abs() < 1e-9);
    }

    #[test]
    fn test_so3_inverse_compose() {
        let rotation = rotation_about(Vector3::new(0.1, 0.2, 0.3));
        let identity = rotation.compose(&rotation.inverse());
        assert!(identity.angle() < TOLERANCE);
    }

    #[test]
    fn test_so3_from_matrix_roundtrip() -> ManifoldResult<()> {
        let rotation = rotation_about(Vector3::new(-0.4, 0.9, 0.2));
        let recovered = SO3::from_matrix(&rotation.matrix(), 1e-9)?;
        assert!(recovered.between(&rotation).angle() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_so3_from_matrix_rejects_scaled_rotation() {
        let matrix = rotation_about(Vector3::new(0.4, 0.0, 0.0)).rotation_matrix() * 2.0;
        assert!(matches!(
            SO3::from_matrix(&matrix, 1e-6),
            Err(ManifoldError::SingularTransform(_))
        ));
    }

    #[test]
    fn test_so3_from_matrix_rejects_reflection() {
        let reflection = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0);
        assert!(SO3::from_matrix(&reflection, 1e-6).is_err());
    }

    #[test]
    fn test_so3_act() {
        let rotation = rotation_about(Vector3::new(0.0, 0.0, PI / 2.0));
        let rotated = rotation.act(&Vector3::new(1.0, 0.0, 0.0));
        assert!((rotated - Vector3::new(0.0, 1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_left_jacobian_small_angle() {
        let tangent = SO3Tangent::new(Vector3::zeros());
        assert_eq!(tangent.left_jacobian(), Matrix3::identity());
    }
}
