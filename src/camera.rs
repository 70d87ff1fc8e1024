//! Pinhole camera intrinsics and depth back-projection.

use crate::extraction::ColoredPointCloud;
use crate::observation::LabelColor;
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Depth values beyond this distance (meters) are discarded during back-projection.
pub const DEFAULT_DEPTH_TRUNCATION: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    #[error("Invalid intrinsics: {0}")]
    InvalidIntrinsics(String),

    #[error("Buffer of length {actual} does not match image size {width}x{height}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },
}

/// Pinhole intrinsics of an RGB-D sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub width: usize,
    pub height: usize,
    pub cx: f64,
    pub cy: f64,
    pub fx: f64,
    pub fy: f64,
    /// Raw depth units per meter (e.g. 5000 for TUM/ICL depth PNGs)
    pub scale: f64,
}

impl CameraIntrinsics {
    pub fn new(
        width: usize,
        height: usize,
        cx: f64,
        cy: f64,
        fx: f64,
        fy: f64,
        scale: f64,
    ) -> Result<Self, CameraError> {
        let intrinsics = Self {
            width,
            height,
            cx,
            cy,
            fx,
            fy,
            scale,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::InvalidIntrinsics(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.fx.is_finite() && self.fx > 0.0 && self.fy.is_finite() && self.fy > 0.0) {
            return Err(CameraError::InvalidIntrinsics(format!(
                "focal lengths must be positive (fx: {}, fy: {})",
                self.fx, self.fy
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CameraError::InvalidIntrinsics(format!(
                "depth scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// The 3x3 calibration matrix K.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(self.fx, 0.0, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0)
    }

    /// Back-project pixel (u, v) at metric depth `z` into the camera frame.
    pub fn unproject(&self, u: f64, v: f64, z: f64) -> Vector3<f64> {
        Vector3::new((u - self.cx) * z / self.fx, (v - self.cy) * z / self.fy, z)
    }

    /// Turn a row-major raw depth buffer and its label buffer into a labeled cloud.
    ///
    /// Raw depth is divided by `scale`; zero depth and depth beyond
    /// [`DEFAULT_DEPTH_TRUNCATION`] produce no point.
    pub fn back_project(
        &self,
        depth: &[u16],
        labels: &[LabelColor],
    ) -> Result<ColoredPointCloud, CameraError> {
        let expected = self.width * self.height;
        for actual in [depth.len(), labels.len()] {
            if actual != expected {
                return Err(CameraError::BufferSizeMismatch {
                    width: self.width,
                    height: self.height,
                    actual,
                });
            }
        }

        let mut cloud = ColoredPointCloud::with_capacity(expected);
        for (index, (&raw, &label)) in depth.iter().zip(labels.iter()).enumerate() {
            if raw == 0 {
                continue;
            }
            let z = raw as f64 / self.scale;
            if z > DEFAULT_DEPTH_TRUNCATION {
                continue;
            }
            let u = (index % self.width) as f64;
            let v = (index / self.width) as f64;
            cloud.push(self.unproject(u, v, z), label);
        }
        Ok(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn tum_like() -> CameraIntrinsics {
        match CameraIntrinsics::new(4, 3, 1.5, 1.0, 2.0, 4.0, 1000.0) {
            Ok(camera) => camera,
            Err(e) => panic!("valid intrinsics rejected: {e}"),
        }
    }

    #[test]
    fn test_back_project_known_pixel() -> Result<(), CameraError> {
        let camera = tum_like();
        let mut depth = vec![0u16; 12];
        let mut labels = vec![LabelColor::BLACK; 12];
        // pixel (u=3, v=2) at 2 m
        depth[2 * 4 + 3] = 2000;
        labels[2 * 4 + 3] = LabelColor::new(1, 2, 3);

        let cloud = camera.back_project(&depth, &labels)?;
        assert_eq!(cloud.len(), 1);
        let point = cloud.points()[0];
        assert!((point - Vector3::new(1.5, 0.5, 2.0)).norm() < TOLERANCE);
        assert_eq!(cloud.colors()[0], LabelColor::new(1, 2, 3));
        Ok(())
    }

    #[test]
    fn test_back_project_rejects_wrong_buffer() {
        let camera = tum_like();
        let result = camera.back_project(&[1, 2, 3], &[LabelColor::BLACK; 12]);
        assert!(matches!(
            result,
            Err(CameraError::BufferSizeMismatch { actual: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_intrinsics() {
        assert!(CameraIntrinsics::new(640, 480, 320.0, 240.0, 0.0, 525.0, 5000.0).is_err());
        assert!(CameraIntrinsics::new(640, 480, 320.0, 240.0, 525.0, 525.0, -1.0).is_err());
    }
}
