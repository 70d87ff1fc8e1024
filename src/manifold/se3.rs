//! SE(3) - Special Euclidean Group in 3D
//!
//! SE(3) elements are represented as a combination of SO(3) rotation and Vector3
//! translation. SE(3) tangent elements are represented as [rho(3), theta(3)] = 6
//! components, where rho is the translational and theta the rotational component.
//!
//! Every pose in a trajectory, every perturbation and every relative error transform of
//! the metrics is an `SE3`.

use crate::manifold::so3::{SO3, SO3Tangent};
use crate::manifold::{LieGroup, ManifoldError, ManifoldResult, RIGID_TOLERANCE, Tangent};
use nalgebra::{Isometry3, Matrix3, Matrix4, Translation3, UnitQuaternion, Vector3, Vector6};
use std::fmt;

/// SE(3) group element representing rigid body transformations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    rotation: SO3,
    translation: Vector3<f64>,
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation();
        let q = self.rotation_quaternion();
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            t.x, t.y, t.z, q.w, q.i, q.j, q.k
        )
    }
}

/// SE(3) tangent space element, [rho_x, rho_y, rho_z, theta_x, theta_y, theta_z].
#[derive(Clone, Debug, PartialEq)]
pub struct SE3Tangent {
    data: Vector6<f64>,
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        SE3 {
            rotation: SO3::new(rotation),
            translation,
        }
    }

    /// Create SE3 from translation components and Euler angles.
    pub fn from_translation_euler(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        let translation = Vector3::new(x, y, z);
        let rotation = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        Self::new(translation, rotation)
    }

    pub fn from_translation_so3(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            rotation,
            translation,
        }
    }
    /// Create SE3 from a 4x4 homogeneous matrix.
    ///
    /// Fails with [`ManifoldError::SingularTransform`] when the matrix is not a rigid
    /// transform: non-finite entries, a bottom row other than [0 0 0 1], or a rotation
    /// block that is not orthonormal with determinant +1.
    pub fn from_matrix(matrix: &Matrix4<f64>) -> ManifoldResult<Self> {
        Self::from_matrix_with_tolerance(matrix, RIGID_TOLERANCE)
    }

    pub fn from_matrix_with_tolerance(
        matrix: &Matrix4<f64>,
        tolerance: f64,
    ) -> ManifoldResult<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(ManifoldError::SingularTransform(
                "matrix contains non-finite entries".to_string(),
            ));
        }
        let bottom = matrix.fixed_view::<1, 4>(3, 0);
        if bottom[0].abs() > tolerance
            || bottom[1].abs() > tolerance
            || bottom[2].abs() > tolerance
            || (bottom[3] - 1.0).abs() > tolerance
        {
            return Err(ManifoldError::SingularTransform(format!(
                "bottom row is [{:.4}, {:.4}, {:.4}, {:.4}], expected [0, 0, 0, 1]",
                bottom[0], bottom[1], bottom[2], bottom[3]
            )));
        }

        let rotation_block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let rotation = SO3::from_matrix(&rotation_block, tolerance)?;
        let translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();

        Ok(SE3 {
            rotation,
            translation,
        })
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    pub fn rotation_so3(&self) -> SO3 {
        self.rotation.clone()
    }

    pub fn rotation_quaternion(&self) -> UnitQuaternion<f64> {
        self.rotation.quaternion()
    }

    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation),
            self.rotation_quaternion(),
        )
    }

    /// Euclidean norm of the translation part.
    pub fn distance_translation(&self) -> f64 {
        self.translation.norm()
    }

    /// Geodesic angle of the rotation part, ‖Log(R)‖.
    pub fn distance_rotation(&self) -> f64 {
        self.rotation.angle()
    }
}

impl LieGroup for SE3 {
    type Matrix = Matrix4<f64>;

    fn identity() -> Self {
        SE3 {
            rotation: SO3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// # Equation 170: Inverse of SE(3) matrix
    /// M⁻¹ = [ Rᵀ -Rᵀt ]
    ///       [ 0    1   ]
    fn inverse(&self) -> Self {
        let rot_inv = self.rotation.inverse();
        let trans_inv = -rot_inv.act(&self.translation);
        SE3::from_translation_so3(trans_inv, rot_inv)
    }

    /// # Equation 171: Composition of SE(3) matrices
    /// M_a M_b = [ R_a*R_b   R_a*t_b + t_a ]
    ///           [ 0             1         ]
    fn compose(&self, other: &Self) -> Self {
        let composed_rotation = self.rotation.compose(&other.rotation);
        let composed_translation = self.rotation.act(&other.translation) + self.translation;
        SE3::from_translation_so3(composed_translation, composed_rotation)
    }

    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(vector) + self.translation
    }

    fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }
}

impl SE3Tangent {
    /// Create a new SE3Tangent from rho (translational) and theta (rotational) components.
    pub fn new(rho: Vector3<f64>, theta: Vector3<f64>) -> Self {
        let mut data = Vector6::zeros();
        data.fixed_rows_mut::<3>(0).copy_from(&rho);
        data.fixed_rows_mut::<3>(3).copy_from(&theta);
        SE3Tangent { data }
    }

    pub fn rho(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(0).into_owned()
    }

    pub fn theta(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(3).into_owned()
    }
}

impl Tangent<SE3> for SE3Tangent {
    /// # Equation 172: SE(3) exponential map
    /// M = exp(τ) = [ R(θ)   V(θ)ρ ]
    ///              [ 0       1    ]
    fn exp(&self) -> SE3 {
        let theta_tangent = SO3Tangent::new(self.theta());
        let rotation = theta_tangent.exp();
        let translation = theta_tangent.left_jacobian() * self.rho();
        SE3::from_translation_so3(translation, rotation)
    }
}
