pub mod config;
pub mod coordinator; // Route → extract → merge → recompute → publish
pub mod insights; // Cross-domain fusion
pub mod models;
pub mod router; // Keyword intent routing
pub mod scoring; // Per-domain derived fields
pub mod store; // Append + dedup merge

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Reads `RUST_LOG`, falling back to `config::default_log_filter()`.
/// Safe to call more than once: later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
