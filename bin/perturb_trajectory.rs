//! Trajectory Perturbation Binary
//!
//! Writes noisy copies of a ground-truth TUM trajectory, one file per
//! (rotation shift, translation shift, sample) combination. Output files are named
//! `<stem>_<rotation>_<translation>_<sample>.txt`.
//!
//! # Usage
//! ```bash
//! cargo run --release --bin perturb_trajectory -- gt.txt -o out/ \
//!     --rotation-shifts 0.05,0.1 --translation-shifts 0.05,0.1 --samples 5
//! ```

use clap::Parser;
use planeslam_eval::io::{StampedPose, TumLoader};
use planeslam_eval::perturbation::{perturb_trajectory, perturbation_jobs};
use planeslam_eval::{PlaneEvalError, PlaneEvalResult, init_logger, io::poses_of};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Generate perturbed initial trajectories from ground truth
#[derive(Parser)]
#[command(name = "perturb_trajectory")]
#[command(about = "Write randomly perturbed copies of a TUM trajectory")]
struct Args {
    /// Ground-truth trajectory (TUM format)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Rotation shift radii (radians)
    #[arg(long, value_delimiter = ',', default_value = "0.05")]
    rotation_shifts: Vec<f64>,

    /// Translation shift radii (meters)
    #[arg(long, value_delimiter = ',', default_value = "0.05")]
    translation_shifts: Vec<f64>,

    /// Perturbed trajectories per shift combination
    #[arg(short, long, default_value = "1")]
    samples: usize,

    /// Base seed; the k-th generated trajectory uses seed + k
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<(), PlaneEvalError> {
    let args = Args::parse();
    init_logger();

    let ground_truth = TumLoader::load(&args.input)?;
    let poses = poses_of(&ground_truth);
    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PlaneEvalError::InvalidInput("input file has no stem".to_string()))?
        .to_string();
    std::fs::create_dir_all(&args.output)?;

    let jobs = perturbation_jobs(
        &args.rotation_shifts,
        &args.translation_shifts,
        args.samples,
        args.seed,
    );
    info!(
        "Writing {} perturbed trajectories of {} poses",
        jobs.len(),
        poses.len()
    );

    jobs.par_iter()
        .map(|job| -> PlaneEvalResult<()> {
            let perturbed = perturb_trajectory(&mut job.rng(), &poses, &job.perturbation);
            let stamped: Vec<StampedPose> = ground_truth
                .iter()
                .zip(perturbed)
                .map(|(original, pose)| StampedPose::new(original.timestamp, pose))
                .collect();
            let path = args
                .output
                .join(format!("{stem}_{}_{}.txt", job.perturbation, job.sample));
            TumLoader::write(&path, &stamped)?;
            info!("Wrote {}", path.display());
            Ok(())
        })
        .collect::<PlaneEvalResult<Vec<()>>>()?;

    Ok(())
}
