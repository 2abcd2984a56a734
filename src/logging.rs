//! Structured logging for wavepetal using the tracing crate.
//!
//! Logs go to stderr so stdout stays reserved for pipeable command output
//! (the rendered image path). Log level is controlled by the RUST_LOG
//! environment variable and defaults to "info".

use tracing_subscriber::prelude::*;

/// Initializes the logging system.
///
/// # Errors
/// - If the subscriber is already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::debug!("Logging initialized");
    Ok(())
}
