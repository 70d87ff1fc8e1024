//! Synthetic planar scenes for benchmarks and tests.
//!
//! A scene is a box-shaped room (floor, ceiling, four walls), a camera trajectory
//! circling inside it, and one label-colored point cloud per frame. Points are sampled
//! on the visible patch of every plane in the world frame, pushed along the plane
//! normal by uniform noise, and expressed in the camera frame of the pose.

use crate::extraction::ColoredPointCloud;
use crate::manifold::{LieGroup, SE3};
use crate::observation::{LabelColor, PlaneId};
use crate::planes::PlaneEquation;
use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::PI;

/// One rectangular planar patch of the room.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanePatch {
    pub color: LabelColor,
    pub origin: Vector3<f64>,
    pub axis_u: Vector3<f64>,
    pub axis_v: Vector3<f64>,
}

impl PlanePatch {
    pub fn plane_id(&self) -> PlaneId {
        PlaneId::from(self.color)
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.axis_u.cross(&self.axis_v).normalize()
    }

    /// World-frame equation of the patch's supporting plane.
    pub fn equation(&self) -> Option<PlaneEquation> {
        let normal = self.normal();
        PlaneEquation::new(normal, -normal.dot(&self.origin))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, noise: f64) -> Vector3<f64> {
        let s: f64 = rng.random_range(0.0..1.0);
        let t: f64 = rng.random_range(0.0..1.0);
        let offset = if noise > 0.0 {
            rng.random_range(-noise..noise)
        } else {
            0.0
        };
        self.origin + self.axis_u * s + self.axis_v * t + self.normal() * offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub poses: usize,
    pub points_per_plane: usize,
    pub background_points: usize,
    /// Half-width of the uniform noise along the plane normal (meters)
    pub noise: f64,
    /// Room extent along x, y, z (meters)
    pub room_size: Vector3<f64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            poses: 10,
            points_per_plane: 1500,
            background_points: 200,
            noise: 0.0,
            room_size: Vector3::new(6.0, 5.0, 3.0),
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poses(mut self, poses: usize) -> Self {
        self.poses = poses;
        self
    }

    pub fn with_points_per_plane(mut self, points_per_plane: usize) -> Self {
        self.points_per_plane = points_per_plane;
        self
    }

    pub fn with_background_points(mut self, background_points: usize) -> Self {
        self.background_points = background_points;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticScene {
    pub patches: Vec<PlanePatch>,
    /// Camera-to-world poses
    pub trajectory: Vec<SE3>,
    /// One labeled cloud per pose, in the camera frame
    pub frames: Vec<ColoredPointCloud>,
}

/// The six faces of an axis-aligned room with one corner at the world origin.
pub fn room_patches(size: Vector3<f64>) -> Vec<PlanePatch> {
    let (sx, sy, sz) = (size.x, size.y, size.z);
    let x = Vector3::x() * sx;
    let y = Vector3::y() * sy;
    let z = Vector3::z() * sz;
    let patch = |r, g, b, origin, axis_u, axis_v| PlanePatch {
        color: LabelColor::new(r, g, b),
        origin,
        axis_u,
        axis_v,
    };
    vec![
        patch(200, 40, 40, Vector3::zeros(), x, y),
        patch(40, 200, 40, z, y, x),
        patch(40, 40, 200, Vector3::zeros(), z, x),
        patch(200, 200, 40, y, x, z),
        patch(200, 40, 200, Vector3::zeros(), y, z),
        patch(40, 200, 200, x, z, y),
    ]
}

/// Camera poses on a circle around the room center, each slightly tilted.
pub fn circular_trajectory(poses: usize, size: Vector3<f64>) -> Vec<SE3> {
    let center = size * 0.5;
    let radius = 0.25 * size.x.min(size.y);
    (0..poses)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / poses.max(1) as f64;
            SE3::from_translation_euler(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z + 0.1 * (2.0 * angle).sin(),
                0.05 * angle.sin(),
                0.05 * angle.cos(),
                angle,
            )
        })
        .collect()
}

pub fn generate_scene<R: Rng + ?Sized>(rng: &mut R, config: &SceneConfig) -> SyntheticScene {
    let patches = room_patches(config.room_size);
    let trajectory = circular_trajectory(config.poses, config.room_size);

    let frames = trajectory
        .iter()
        .map(|pose| {
            let world_to_camera = pose.inverse();
            let mut cloud = ColoredPointCloud::with_capacity(
                patches.len() * config.points_per_plane + config.background_points,
            );
            for patch in &patches {
                for _ in 0..config.points_per_plane {
                    let world = patch.sample(rng, config.noise);
                    cloud.push(world_to_camera.act(&world), patch.color);
                }
            }
            for _ in 0..config.background_points {
                let point = Vector3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(0.5..3.0),
                );
                cloud.push(point, LabelColor::BLACK);
            }
            cloud
        })
        .collect();

    SyntheticScene {
        patches,
        trajectory,
        frames,
    }
}
