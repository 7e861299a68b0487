//! Environment/runtime helpers
//!
//! Sanity checks for optional directories at startup.

use tracing::warn;

/// Warn when the static assets directory is missing. The data directory is
/// owned by the storage resolver, which probes and creates it per call.
pub async fn check_frontend_dir(frontend_dir: &str) {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; static assets may 404");
    }
}
