//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=delve::streaming=debug` for per-tick scheduler output.
///
/// # Example
/// ```
/// delve::core::logging::init();
/// log::info!("Generator started");
/// ```
pub fn init() {
    // try_init: tests and tools may call this more than once
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .try_init();
}
