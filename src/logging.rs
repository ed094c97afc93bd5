use tracing_subscriber::EnvFilter;

use crate::config;

/// Install the global fmt subscriber.
///
/// Directives come from `LABTRACK_LOG`, then `RUST_LOG`, then the built-in
/// default. Calling this twice is harmless; the second call is a no-op.
pub fn init() {
    let filter = std::env::var(config::LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(config::default_log_filter()));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
