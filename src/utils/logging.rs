//! Tracing subscriber bootstrap for binaries and examples.

use tracing_subscriber::EnvFilter;

/// Installs a global tracing subscriber.
///
/// The filter honors `RUST_LOG` and defaults to `info`. Calling this more
/// than once is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
