//! Trajectory Evaluation Binary
//!
//! Compares an estimated trajectory against ground truth, both in TUM format, and
//! reports APE and RPE.
//!
//! # Usage
//! ```bash
//! cargo run --release --bin evaluate_trajectory -- groundtruth.txt estimate.txt
//! ```

use clap::Parser;
use planeslam_eval::io::TumLoader;
use planeslam_eval::{PlaneEvalError, ape, init_logger, rpe};
use std::path::PathBuf;
use tracing::{info, warn};

/// Absolute and relative pose error of a TUM trajectory
#[derive(Parser)]
#[command(name = "evaluate_trajectory")]
#[command(about = "APE/RPE of an estimated trajectory against ground truth")]
struct Args {
    /// Ground-truth trajectory (TUM format)
    #[arg(value_name = "GROUND_TRUTH")]
    ground_truth: PathBuf,

    /// Estimated trajectory (TUM format)
    #[arg(value_name = "ESTIMATE")]
    estimate: PathBuf,

    /// Compare only the first N poses of both files
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

fn main() -> Result<(), PlaneEvalError> {
    let args = Args::parse();
    init_logger();

    let mut ground_truth = TumLoader::load_poses(&args.ground_truth)?;
    let mut estimate = TumLoader::load_poses(&args.estimate)?;
    info!(
        "Loaded {} ground-truth and {} estimated poses",
        ground_truth.len(),
        estimate.len()
    );

    if let Some(limit) = args.limit {
        ground_truth.truncate(limit);
        estimate.truncate(limit);
    }
    if ground_truth.len() != estimate.len() {
        warn!("Trajectory lengths differ; timestamps are not associated");
    }

    let absolute = ape(&ground_truth, &estimate)?;
    let relative = rpe(&ground_truth, &estimate)?;

    info!("APE {}", absolute);
    info!("RPE {}", relative);
    println!(
        "{:.6} {:.6} {:.6} {:.6}",
        absolute.translation, absolute.rotation, relative.translation, relative.rotation
    );
    Ok(())
}
