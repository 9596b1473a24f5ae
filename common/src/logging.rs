use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber from a level string
/// (`trace`|`debug`|`info`|`warn`|`error`). Falls back to `info` if the
/// level is missing or unparsable. Safe to call exactly once per process.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
