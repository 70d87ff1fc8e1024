use crate::manifold::{LieGroup, SE3};
use crate::metrics::{MetricsError, PoseError, check_lengths};

/// Relative pose error over consecutive poses.
///
/// With motions dTᵍᵗᵢ = Tᵍᵗᵢ⁻¹ Tᵍᵗᵢ₊₁ and dTᵉˢᵗᵢ likewise, the error of step i is
/// (dTᵍᵗᵢ)⁻¹ dTᵉˢᵗᵢ.
pub fn rpe(ground_truth: &[SE3], estimate: &[SE3]) -> Result<PoseError, MetricsError> {
    check_lengths(ground_truth, estimate)?;
    if ground_truth.len() < 2 {
        return Err(MetricsError::EmptyTrajectory {
            metric: "RPE",
            required: 2,
            actual: ground_truth.len(),
        });
    }

    let errors: Vec<SE3> = ground_truth
        .windows(2)
        .zip(estimate.windows(2))
        .map(|(gt, est)| {
            let gt_motion = gt[0].between(&gt[1]);
            let est_motion = est[0].between(&est[1]);
            gt_motion.between(&est_motion)
        })
        .collect();

    Ok(PoseError::from_error_transforms(&errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_utils::spiral_trajectory;

    const TOLERANCE: f64 = 1e-10;

    fn drifted(trajectory: &[SE3]) -> Vec<SE3> {
        trajectory
            .iter()
            .enumerate()
            .map(|(i, pose)| {
                pose.compose(&SE3::from_translation_euler(
                    0.02 * i as f64,
                    0.0,
                    -0.01 * i as f64,
                    0.0,
                    0.0,
                    0.005 * i as f64,
                ))
            })
            .collect()
    }

    #[test]
    fn test_rpe_identical_is_zero() -> Result<(), MetricsError> {
        let trajectory = spiral_trajectory(12);
        let error = rpe(&trajectory, &trajectory)?;
        assert!(error.translation < TOLERANCE);
        assert!(error.rotation < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_rpe_invariant_under_left_shift_of_one_trajectory() -> Result<(), MetricsError> {
        let gt = spiral_trajectory(12);
        let est = drifted(&gt);
        let shift = SE3::from_translation_euler(-2.0, 0.5, 4.0, 1.0, -0.3, 0.2);
        let est_shifted: Vec<SE3> = est.iter().map(|p| shift.compose(p)).collect();

        let before = rpe(&gt, &est)?;
        let after = rpe(&gt, &est_shifted)?;
        assert!(before.translation > 1e-3);
        assert!((before.translation - after.translation).abs() < TOLERANCE);
        assert!((before.rotation - after.rotation).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_rpe_sensitive_to_body_frame_change_of_one_trajectory() -> Result<(), MetricsError> {
        let gt = spiral_trajectory(12);
        // Re-expressing one trajectory in another body frame changes every relative motion
        let body = SE3::from_translation_euler(0.5, -0.2, 0.1, 0.3, 0.2, -0.4);
        let est: Vec<SE3> = gt.iter().map(|p| p.compose(&body)).collect();

        let error = rpe(&gt, &est)?;
        assert!(error.translation > 1e-3);
        assert!(error.rotation > 1e-3);
        Ok(())
    }

    #[test]
    fn test_rpe_constant_motion_error() -> Result<(), MetricsError> {
        let step = SE3::from_translation_euler(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let long_step = SE3::from_translation_euler(1.1, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut gt = vec![SE3::identity()];
        let mut est = vec![SE3::identity()];
        for i in 0..4 {
            gt.push(gt[i].compose(&step));
            est.push(est[i].compose(&long_step));
        }
        let error = rpe(&gt, &est)?;
        assert!((error.translation - 0.1).abs() < TOLERANCE);
        assert!(error.rotation < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_rpe_needs_two_poses() {
        let single = spiral_trajectory(1);
        assert_eq!(
            rpe(&single, &single),
            Err(MetricsError::EmptyTrajectory {
                metric: "RPE",
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_rpe_length_mismatch() {
        assert!(matches!(
            rpe(&spiral_trajectory(5), &spiral_trajectory(6)),
            Err(MetricsError::LengthMismatch { .. })
        ));
    }
}
