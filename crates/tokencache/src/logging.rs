//! Logging configuration using tracing.
//!
//! Obtained tokens are reported at `info` level under the
//! `tokencache::token_cache` target, so `RUST_LOG=tokencache=info` shows one
//! line per token.

use tokencache_types::error::{Result, TokenCacheError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Filtering comes from `RUST_LOG`, defaulting to `warn`. Output goes to
/// stderr.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| {
            TokenCacheError::Io(std::io::Error::other(format!(
                "Failed to initialize tracing: {}",
                e
            )))
        })?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized).
pub fn init_test() {
    let _ = init();
}
