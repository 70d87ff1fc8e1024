//! Centralized logging configuration for planeslam-eval binaries
//!
//! Library code only emits `tracing` events; binaries install the subscriber.

use tracing::Level;

/// Initialize the tracing subscriber with the default INFO level
///
/// The level can be overridden through the `RUST_LOG` environment variable.
///
/// # Example
/// ```no_run
/// use planeslam_eval::init_logger;
///
/// init_logger();
/// tracing::info!("Evaluation started");
/// ```
///
/// ```bash
/// RUST_LOG=planeslam_eval=debug cargo run --bin synthetic_benchmark
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(true)
        .with_thread_names(false)
        .init();
}
