//! Plane extraction from label-colored point clouds.
//!
//! Each non-black label color identifies one plane. Points are grouped by exact color
//! and groups with too little support are dropped.

use crate::observation::{LabelColor, Observation, PlaneId};
use nalgebra::Vector3;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Default minimum number of points a color group needs to be kept as a plane.
pub const DEFAULT_MIN_SUPPORT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Point cloud has {points} points but {labels} labels")]
    LabelCountMismatch { points: usize, labels: usize },
}

/// A point cloud with one label color per point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColoredPointCloud {
    points: Vec<Vector3<f64>>,
    colors: Vec<LabelColor>,
}

impl ColoredPointCloud {
    pub fn new(
        points: Vec<Vector3<f64>>,
        colors: Vec<LabelColor>,
    ) -> Result<Self, ExtractionError> {
        if points.len() != colors.len() {
            return Err(ExtractionError::LabelCountMismatch {
                points: points.len(),
                labels: colors.len(),
            });
        }
        Ok(Self { points, colors })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Vector3<f64>, color: LabelColor) {
        self.points.push(point);
        self.colors.push(color);
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn colors(&self) -> &[LabelColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Configuration for [`PlaneExtractor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneExtractorConfig {
    /// Groups with fewer points than this are discarded
    pub min_support: usize,
}

impl Default for PlaneExtractorConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
        }
    }
}

impl PlaneExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_support(mut self, min_support: usize) -> Self {
        self.min_support = min_support;
        self
    }
}

/// Splits a labeled point cloud into per-plane point sets.
#[derive(Debug, Clone, Default)]
pub struct PlaneExtractor {
    config: PlaneExtractorConfig,
}

impl PlaneExtractor {
    pub fn new(config: PlaneExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaneExtractorConfig {
        &self.config
    }

    /// Group the cloud's points by label color, skipping background and small groups.
    pub fn extract(&self, cloud: &ColoredPointCloud) -> Observation {
        let mut groups: HashMap<LabelColor, Vec<Vector3<f64>>> = HashMap::new();
        for (point, color) in cloud.points.iter().zip(cloud.colors.iter()) {
            if color.is_background() {
                continue;
            }
            groups.entry(*color).or_default().push(*point);
        }

        let total_groups = groups.len();
        let observation: Observation = groups
            .into_iter()
            .filter(|(_, points)| points.len() >= self.config.min_support)
            .map(|(color, points)| (PlaneId::from(color), points))
            .collect();

        debug!(
            "Extracted {} of {} labeled groups (min support {})",
            observation.len(),
            total_groups,
            self.config.min_support
        );
        observation
    }
}
