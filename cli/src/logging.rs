use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr so table output on stdout stays clean.
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("warn")));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
