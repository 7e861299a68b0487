use std::path::Path;

use tokio::fs;
use tracing::warn;

/// Whether durable storage is usable for the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Durable,
    Volatile,
}

/// Probe artifact name. Contains `~`, which the filename sanitizer never
/// emits, so it cannot collide with a stored entry.
const PROBE_FILE: &str = ".write-probe~";

/// Check that the durable directory can be created and written to.
///
/// Creates the directory (parents included), writes a small marker, and
/// deletes it again. Any failure yields `Volatile` for this evaluation with
/// the reason logged; there are no retries. Callers re-probe on later calls,
/// so a transient permission problem can heal.
pub async fn probe(dir: &Path) -> StorageMode {
    match probe_inner(dir).await {
        Ok(()) => StorageMode::Durable,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "durable storage unavailable, using in-memory store");
            StorageMode::Volatile
        }
    }
}

async fn probe_inner(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir).await?;
    let marker = dir.join(PROBE_FILE);
    fs::write(&marker, b"{\"test\":true}").await?;
    fs::remove_file(&marker).await?;
    Ok(())
}
