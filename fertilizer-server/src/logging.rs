use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stdout.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info"`) is used.
/// Calling this twice is harmless, the second subscriber is simply not installed.
///
/// ```
/// fertilizer_server::init_logging("info");
/// ```
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).try_init();
}
