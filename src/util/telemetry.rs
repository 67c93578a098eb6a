//! Telemetry helpers for structured logging and tracing.

/// Install the default env-filtered fmt subscriber unless one is already set.
///
/// Filtering follows `RUST_LOG`; when it is unset the scheduler logs at `info`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
