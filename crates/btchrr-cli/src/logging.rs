//! Logging setup for the command line

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber.
///
/// RUST_LOG takes precedence over `default_filter`. Output goes to stderr so
/// results printed on stdout stay machine-readable.
pub fn init(default_filter: &str, json: bool) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!(filter = %default_filter, json, "logging initialized");
    Ok(())
}
