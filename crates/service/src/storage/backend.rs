use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ServiceError;

/// Contract shared by the durable and volatile backends.
#[async_trait]
pub trait SaveBackend: Send + Sync {
    /// Remove every prior entry belonging to `owner` (compared
    /// case-insensitively), then store `payload` under `filename`.
    /// Returns how many old entries were removed.
    async fn purge_and_write(
        &self,
        owner: &str,
        filename: &str,
        payload: &Value,
    ) -> Result<usize, ServiceError>;

    /// Names currently visible in this backend; read-only.
    async fn list_names(&self) -> Result<Vec<String>, ServiceError>;
}
