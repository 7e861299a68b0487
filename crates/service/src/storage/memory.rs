use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// One persisted payload. The owner is stored lowercase so comparisons are
/// case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub owner: String,
    pub filename: String,
    pub payload: Value,
    pub saved_at: DateTime<Utc>,
}

/// In-process fallback store holding at most one entry per owner.
///
/// Constructed explicitly and injected into the service rather than living
/// as a process-wide global, so each test builds an isolated store. Contents
/// survive for the lifetime of the running service and are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry keyed by `entry.owner`; returns whether one existed.
    /// Remove and insert happen under a single write lock so readers never
    /// observe a torn state.
    pub async fn replace(&self, entry: StoredEntry) -> bool {
        let mut map = self.inner.write().await;
        let existed = map.remove(&entry.owner).is_some();
        map.insert(entry.owner.clone(), entry);
        existed
    }

    pub async fn get(&self, owner: &str) -> Option<StoredEntry> {
        let map = self.inner.read().await;
        map.get(&owner.to_lowercase()).cloned()
    }

    /// Owners that currently have a stored entry.
    pub async fn keys(&self) -> Vec<String> {
        let map = self.inner.read().await;
        map.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
