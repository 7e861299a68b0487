//! The save operation: validate, sanitize, purge the owner's old entries,
//! write the new payload.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::ServiceError;
use crate::storage::{
    probe, DurableBackend, MemoryStore, SaveBackend, StorageMode, VolatileBackend,
};

/// Which backend actually served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Durable,
    Volatile,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Durable => "durable",
            BackendKind::Volatile => "volatile",
        }
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub filename: String,
    pub backend: BackendKind,
    pub removed: usize,
}

/// Snapshot of what is currently stored and where it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct SavedListing {
    pub backend: BackendKind,
    pub names: Vec<String>,
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// Pure and idempotent; the output has the same character count as the
/// input.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Persists the latest payload per owner, durable-first with call-scoped
/// fallback to an in-memory store.
#[derive(Clone)]
pub struct SaveService {
    data_dir: PathBuf,
    durable: DurableBackend,
    volatile: VolatileBackend,
}

impl SaveService {
    pub fn new<P: Into<PathBuf>>(data_dir: P, store: MemoryStore) -> Self {
        let data_dir = data_dir.into();
        Self {
            durable: DurableBackend::new(data_dir.clone()),
            volatile: VolatileBackend::new(store),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Store `payload` under the sanitized `filename`, replacing any prior
    /// entries belonging to `owner` (compared case-insensitively).
    ///
    /// The durable directory is re-probed on every call. When the probe or
    /// any durable sub-step fails, the call lands in the in-memory store
    /// instead and still succeeds; a durable failure never fails the
    /// request. Validation failures return [`ServiceError::InvalidRequest`]
    /// before any side effect.
    pub async fn save(
        &self,
        owner: &str,
        filename: &str,
        payload: &Value,
    ) -> Result<SaveOutcome, ServiceError> {
        if owner.trim().is_empty() {
            return Err(ServiceError::invalid("username is required"));
        }
        if filename.trim().is_empty() {
            return Err(ServiceError::invalid("Filename and data are required"));
        }

        let clean = sanitize_filename(filename);

        if probe(&self.data_dir).await == StorageMode::Durable {
            match self.durable.purge_and_write(owner, &clean, payload).await {
                Ok(removed) => {
                    return Ok(SaveOutcome {
                        filename: clean,
                        backend: BackendKind::Durable,
                        removed,
                    })
                }
                // Call-scoped demotion: availability over durability. The
                // caller still gets success, with the backend indicated.
                Err(e) => warn!(error = %e, "durable save failed, falling back to in-memory store"),
            }
        }

        let removed = self.volatile.purge_and_write(owner, &clean, payload).await?;
        Ok(SaveOutcome {
            filename: clean,
            backend: BackendKind::Volatile,
            removed,
        })
    }

    /// What is currently stored. Read-only: no probe write happens here,
    /// the write-probe belongs to `save`.
    ///
    /// Entries only land in the in-memory store when saves fell back, so a
    /// non-empty store means the current backend is volatile and its owners
    /// are reported. Otherwise the `.json` files in the durable directory
    /// are listed; a failed directory read falls back to the (empty) store.
    pub async fn list_saved(&self) -> Result<SavedListing, ServiceError> {
        let names = self.volatile.list_names().await?;
        if !names.is_empty() {
            return Ok(SavedListing {
                backend: BackendKind::Volatile,
                names,
            });
        }
        match self.durable.list_names().await {
            Ok(names) => Ok(SavedListing {
                backend: BackendKind::Durable,
                names,
            }),
            Err(e) => {
                warn!(error = %e, "durable listing failed, reading in-memory store");
                Ok(SavedListing {
                    backend: BackendKind::Volatile,
                    names: Vec::new(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::fs;
    use uuid::Uuid;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("save_svc_{}_{}", tag, Uuid::new_v4()))
    }

    fn service(dir: &Path) -> (SaveService, MemoryStore) {
        let store = MemoryStore::new();
        (SaveService::new(dir, store.clone()), store)
    }

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_filename("alice notes.json"), "alice_notes.json");
        assert_eq!(sanitize_filename("a/b\\c:d.json"), "a_b_c_d.json");
        assert_eq!(sanitize_filename("safe_name-1.json"), "safe_name-1.json");
    }

    #[test]
    fn sanitize_is_idempotent_and_length_preserving() {
        for s in ["weird name!?.json", "läßt.json", "..--__", "a b c", "ü~ü"] {
            let once = sanitize_filename(s);
            assert_eq!(sanitize_filename(&once), once);
            assert_eq!(once.chars().count(), s.chars().count());
            assert!(once
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
        }
    }

    #[tokio::test]
    async fn saving_twice_leaves_one_file_per_owner() -> Result<(), anyhow::Error> {
        let dir = temp_dir("twice");
        let (svc, _) = service(&dir);

        let first = svc.save("bob", "bob_first.json", &json!({"n": 1})).await?;
        assert_eq!(first.backend, BackendKind::Durable);
        assert_eq!(first.removed, 0);

        let second = svc.save("bob", "bob_second.json", &json!({"n": 2})).await?;
        assert_eq!(second.backend, BackendKind::Durable);
        assert_eq!(second.removed, 1);

        let listing = svc.list_saved().await?;
        assert_eq!(listing.backend, BackendKind::Durable);
        assert_eq!(listing.names, vec!["bob_second.json"]);

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn purge_matches_owner_case_insensitively() -> Result<(), anyhow::Error> {
        let dir = temp_dir("case");
        let (svc, _) = service(&dir);

        svc.save("Alice", "alice_notes.json", &json!({"a": 1})).await?;
        let second = svc.save("alice", "alice_notes2.json", &json!({"b": 2})).await?;

        assert_eq!(second.removed, 1);
        assert_eq!(svc.list_saved().await?.names, vec!["alice_notes2.json"]);

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn filename_is_sanitized_before_write() -> Result<(), anyhow::Error> {
        let dir = temp_dir("sanitize");
        let (svc, _) = service(&dir);

        let outcome = svc.save("carol", "carol my file?.json", &json!(true)).await?;
        assert_eq!(outcome.filename, "carol_my_file_.json");
        assert!(fs::metadata(dir.join("carol_my_file_.json")).await.is_ok());

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_owner_or_filename_rejected_without_side_effects() -> Result<(), anyhow::Error> {
        let dir = temp_dir("invalid");
        let (svc, store) = service(&dir);

        assert!(matches!(
            svc.save("", "x.json", &json!(1)).await,
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(matches!(
            svc.save("dave", "  ", &json!(1)).await,
            Err(ServiceError::InvalidRequest(_))
        ));

        // no probe, no directory, no memory entry
        assert!(fs::metadata(&dir).await.is_err());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn falsy_payloads_are_valid() -> Result<(), anyhow::Error> {
        let dir = temp_dir("falsy");
        let (svc, _) = service(&dir);

        for payload in [json!(false), json!(0), json!(""), json!({}), json!([])] {
            let outcome = svc.save("erin", "erin_v.json", &payload).await?;
            assert_eq!(outcome.filename, "erin_v.json");
        }

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_read_only_and_creates_nothing() -> Result<(), anyhow::Error> {
        let dir = temp_dir("list_ro");
        let (svc, _) = service(&dir);

        let listing = svc.list_saved().await?;
        assert_eq!(listing.backend, BackendKind::Volatile);
        assert!(listing.names.is_empty());

        // the data directory must not have been created by a read
        assert!(fs::metadata(&dir).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_data_dir_falls_back_to_memory() -> Result<(), anyhow::Error> {
        // parent is a file, so the probe can never create the directory
        let blocker = temp_dir("blocked");
        fs::write(&blocker, b"").await?;
        let dir = blocker.join("data");
        let (svc, store) = service(&dir);

        let outcome = svc.save("frank", "frank_cfg.json", &json!({"k": "v"})).await?;
        assert_eq!(outcome.backend, BackendKind::Volatile);
        assert_eq!(outcome.removed, 0);
        assert_eq!(store.len().await, 1);

        let listing = svc.list_saved().await?;
        assert_eq!(listing.backend, BackendKind::Volatile);
        assert_eq!(listing.names, vec!["frank"]);

        let _ = fs::remove_file(&blocker).await;
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn read_only_data_dir_falls_back_to_memory() -> Result<(), anyhow::Error> {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("readonly");
        fs::create_dir_all(&dir).await?;
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555))?;

        // permission bits do not bind a privileged user; skip there
        if std::fs::write(dir.join("canary"), b"").is_ok() {
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755))?;
            let _ = fs::remove_dir_all(&dir).await;
            return Ok(());
        }

        let (svc, _) = service(&dir);
        let outcome = svc.save("grace", "grace_data.json", &json!({"x": 1})).await?;
        assert_eq!(outcome.backend, BackendKind::Volatile);

        let listing = svc.list_saved().await?;
        assert_eq!(listing.backend, BackendKind::Volatile);
        assert_eq!(listing.names, vec!["grace"]);

        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755))?;
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
