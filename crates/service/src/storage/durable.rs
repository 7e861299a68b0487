use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::backend::SaveBackend;

/// Filesystem backend: one pretty-printed JSON file per saved entry.
///
/// Files belonging to an owner follow the `<lowercase-owner>_<suffix>`
/// convention; the write path does not enforce it, only the purge's prefix
/// match relies on it.
#[derive(Clone)]
pub struct DurableBackend {
    dir: PathBuf,
}

impl DurableBackend {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SaveBackend for DurableBackend {
    async fn purge_and_write(
        &self,
        owner: &str,
        filename: &str,
        payload: &Value,
    ) -> Result<usize, ServiceError> {
        let prefix = format!("{}_", owner.to_lowercase());

        let mut removed = 0usize;
        let mut entries = fs::read_dir(&self.dir).await.map_err(io_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&prefix) {
                continue;
            }
            // A file that refuses to die is logged and skipped; the save
            // itself still proceeds.
            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    info!(file = name, "removed old file");
                    removed += 1;
                }
                Err(e) => warn!(file = name, error = %e, "could not remove old file"),
            }
        }

        // serde_json pretty printing is deterministic for a given Value
        let bytes =
            serde_json::to_vec_pretty(payload).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(self.dir.join(filename), bytes).await.map_err(io_err)?;
        Ok(removed)
    }

    async fn list_names(&self) -> Result<Vec<String>, ServiceError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await.map_err(io_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn io_err(e: std::io::Error) -> ServiceError {
    ServiceError::Storage(e.to_string())
}
