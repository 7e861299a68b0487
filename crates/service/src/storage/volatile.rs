use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::errors::ServiceError;
use crate::storage::backend::SaveBackend;
use crate::storage::memory::{MemoryStore, StoredEntry};

/// In-memory backend over an injected [`MemoryStore`].
#[derive(Clone)]
pub struct VolatileBackend {
    store: MemoryStore,
}

impl VolatileBackend {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SaveBackend for VolatileBackend {
    async fn purge_and_write(
        &self,
        owner: &str,
        filename: &str,
        payload: &Value,
    ) -> Result<usize, ServiceError> {
        let entry = StoredEntry {
            owner: owner.to_lowercase(),
            filename: filename.to_string(),
            payload: payload.clone(),
            saved_at: Utc::now(),
        };
        let existed = self.store.replace(entry).await;
        Ok(usize::from(existed))
    }

    async fn list_names(&self) -> Result<Vec<String>, ServiceError> {
        let mut names = self.store.keys().await;
        names.sort();
        Ok(names)
    }
}
