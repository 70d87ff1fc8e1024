use crate::manifold::{LieGroup, SE3};
use crate::metrics::{MetricsError, PoseError, check_lengths};

/// Absolute pose error.
///
/// Both trajectories are first expressed in the frame of their own first pose
/// (T'ᵢ = T₀⁻¹ Tᵢ); the error of index i is dTᵢ = T'ᵍᵗᵢ⁻¹ T'ᵉˢᵗᵢ.
pub fn ape(ground_truth: &[SE3], estimate: &[SE3]) -> Result<PoseError, MetricsError> {
    check_lengths(ground_truth, estimate)?;
    let (Some(gt_origin), Some(est_origin)) = (ground_truth.first(), estimate.first()) else {
        return Err(MetricsError::EmptyTrajectory {
            metric: "APE",
            required: 1,
            actual: 0,
        });
    };

    let gt_origin_inv = gt_origin.inverse();
    let est_origin_inv = est_origin.inverse();

    let errors: Vec<SE3> = ground_truth
        .iter()
        .zip(estimate.iter())
        .map(|(gt, est)| {
            let gt_local = gt_origin_inv.compose(gt);
            let est_local = est_origin_inv.compose(est);
            gt_local.between(&est_local)
        })
        .collect();

    Ok(PoseError::from_error_transforms(&errors))
}
