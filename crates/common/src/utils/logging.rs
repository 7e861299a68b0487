use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber for the save service.
///
/// Respects `RUST_LOG` when set, otherwise defaults to `info` with HTTP
/// layer noise kept at `info`. Writes compact lines to stdout so container
/// environments that hide stderr still show logs. Safe to call more than
/// once (tests re-enter it); later calls are no-ops.
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(|| io::stdout())
        .try_init();
}
