use super::*;
use memmap2::Mmap;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Fields per line: timestamp tx ty tz qx qy qz qw
const TUM_FIELDS: usize = 8;

/// Line count above which lines are parsed in parallel.
const PARALLEL_THRESHOLD: usize = 5000;

/// Reader and writer of TUM RGB-D trajectory files.
pub struct TumLoader;

impl TumLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<StampedPose>, IoError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap).map_err(|e| IoError::Parse {
            line: 0,
            message: format!("Invalid UTF-8: {e}"),
        })?;

        Self::parse_content(content)
    }

    /// Load only the poses, dropping timestamps.
    pub fn load_poses<P: AsRef<Path>>(path: P) -> Result<Vec<SE3>, IoError> {
        Ok(poses_of(&Self::load(path)?))
    }

    pub fn write<P: AsRef<Path>>(path: P, trajectory: &[StampedPose]) -> Result<(), IoError> {
        let mut writer = BufWriter::new(File::create(path)?);
        for stamped in trajectory {
            let t = stamped.pose.translation();
            let q = stamped.pose.rotation_quaternion();
            writeln!(
                writer,
                "{:.6} {:.9} {:.9} {:.9} {:.9} {:.9} {:.9} {:.9}",
                stamped.timestamp, t.x, t.y, t.z, q.i, q.j, q.k, q.w
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write poses stamped with their frame index.
    pub fn write_poses<P: AsRef<Path>>(path: P, poses: &[SE3]) -> Result<(), IoError> {
        let stamped: Vec<StampedPose> = poses
            .iter()
            .enumerate()
            .map(|(index, pose)| StampedPose::new(index as f64, pose.clone()))
            .collect();
        Self::write(path, &stamped)
    }

    fn parse_content(content: &str) -> Result<Vec<StampedPose>, IoError> {
        let lines: Vec<&str> = content.lines().collect();

        let parsed: Vec<Option<StampedPose>> = if lines.len() > PARALLEL_THRESHOLD {
            lines
                .par_iter()
                .enumerate()
                .map(|(line_num, line)| Self::parse_line(line, line_num + 1))
                .collect::<Result<_, _>>()?
        } else {
            lines
                .iter()
                .enumerate()
                .map(|(line_num, line)| Self::parse_line(line, line_num + 1))
                .collect::<Result<_, _>>()?
        };

        Ok(parsed.into_iter().flatten().collect())
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Option<StampedPose>, IoError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < TUM_FIELDS {
            return Err(IoError::MissingFields {
                line: line_num,
                expected: TUM_FIELDS,
                found: parts.len(),
            });
        }

        let mut values = [0.0; TUM_FIELDS];
        for (value, part) in values.iter_mut().zip(parts.iter()) {
            *value = part.parse::<f64>().map_err(|_| IoError::InvalidNumber {
                line: line_num,
                value: part.to_string(),
            })?;
        }
        let [timestamp, x, y, z, qx, qy, qz, qw] = values;

        let quaternion = Quaternion::new(qw, qx, qy, qz);
        let norm = quaternion.norm();
        if !norm.is_finite() || norm <= f64::EPSILON {
            return Err(IoError::InvalidQuaternion { line: line_num });
        }

        Ok(Some(StampedPose::new(
            timestamp,
            SE3::new(
                Vector3::new(x, y, z),
                UnitQuaternion::from_quaternion(quaternion),
            ),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::LieGroup;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOLERANCE: f64 = 1e-8;

    #[test]
    fn test_load_tum_file() -> Result<(), IoError> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "# timestamp tx ty tz qx qy qz qw")?;
        writeln!(temp_file, "1305031102.175304 1.0 2.0 3.0 0.0 0.0 0.0 1.0")?;
        writeln!(temp_file)?;
        writeln!(temp_file, "1305031102.211214 1.5 2.0 3.0 0.0 0.0 0.7071068 0.7071068")?;

        let trajectory = TumLoader::load(temp_file.path())?;
        assert_eq!(trajectory.len(), 2);
        assert!((trajectory[0].timestamp - 1305031102.175304).abs() < 1e-6);
        assert!((trajectory[1].pose.translation().x - 1.5).abs() < TOLERANCE);
        assert!((trajectory[1].pose.distance_rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_write_then_load() -> Result<(), IoError> {
        let poses: Vec<SE3> = (0..5)
            .map(|i| {
                let t = i as f64 * 0.3;
                SE3::from_translation_euler(t.cos(), t.sin(), 0.1 * t, 0.2 * t, -0.1, t)
            })
            .collect();
        let temp_file = NamedTempFile::new()?;
        TumLoader::write_poses(temp_file.path(), &poses)?;

        let loaded = TumLoader::load(temp_file.path())?;
        assert_eq!(loaded.len(), poses.len());
        for (index, (stamped, original)) in loaded.iter().zip(poses.iter()).enumerate() {
            assert!((stamped.timestamp - index as f64).abs() < TOLERANCE);
            let error = original.between(&stamped.pose);
            assert!(error.distance_translation() < TOLERANCE);
            assert!(error.distance_rotation() < TOLERANCE);
        }
        Ok(())
    }

    #[test]
    fn test_missing_fields() -> Result<(), std::io::Error> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "0.0 1.0 2.0 3.0 0.0 0.0 0.0 1.0")?;
        writeln!(temp_file, "0.1 1.0 2.0 3.0")?;

        let result = TumLoader::load(temp_file.path());
        assert!(matches!(
            result,
            Err(IoError::MissingFields {
                line: 2,
                expected: 8,
                found: 4
            })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_number() -> Result<(), std::io::Error> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "0.0 1.0 abc 3.0 0.0 0.0 0.0 1.0")?;

        let result = TumLoader::load(temp_file.path());
        assert!(matches!(
            result,
            Err(IoError::InvalidNumber { line: 1, ref value }) if value == "abc"
        ));
        Ok(())
    }

    #[test]
    fn test_zero_quaternion_rejected() -> Result<(), std::io::Error> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "0.0 1.0 2.0 3.0 0.0 0.0 0.0 0.0")?;
        assert!(matches!(
            TumLoader::load(temp_file.path()),
            Err(IoError::InvalidQuaternion { line: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_large_file_parsed_in_order() -> Result<(), IoError> {
        let mut temp_file = NamedTempFile::new()?;
        for i in 0..(PARALLEL_THRESHOLD + 10) {
            writeln!(temp_file, "{i}.0 {i}.0 0.0 0.0 0.0 0.0 0.0 1.0")?;
        }
        let poses = TumLoader::load_poses(temp_file.path())?;
        assert_eq!(poses.len(), PARALLEL_THRESHOLD + 10);
        assert!(poses
            .iter()
            .enumerate()
            .all(|(i, pose)| (pose.translation().x - i as f64).abs() < TOLERANCE));
        Ok(())
    }
}
