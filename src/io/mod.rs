//! Trajectory file I/O.

use crate::manifold::SE3;
use std::fmt;
use thiserror::Error;

pub mod tum;

pub use tum::TumLoader;

/// Errors that can occur while reading or writing trajectory files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid number format at line {line}: {value}")]
    InvalidNumber { line: usize, value: String },

    #[error("Missing required fields at line {line}: expected {expected}, found {found}")]
    MissingFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Degenerate quaternion at line {line}")]
    InvalidQuaternion { line: usize },
}

/// A pose with the timestamp (seconds) it was recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedPose {
    pub timestamp: f64,
    pub pose: SE3,
}

impl StampedPose {
    pub fn new(timestamp: f64, pose: SE3) -> Self {
        Self { timestamp, pose }
    }
}

impl fmt::Display for StampedPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StampedPose [ t: {:.6}, pose: {} ]", self.timestamp, self.pose)
    }
}

/// Strip the timestamps of a stamped trajectory.
pub fn poses_of(trajectory: &[StampedPose]) -> Vec<SE3> {
    trajectory.iter().map(|stamped| stamped.pose.clone()).collect()
}
