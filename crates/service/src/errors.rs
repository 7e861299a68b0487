use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn invalid(msg: &str) -> Self {
        Self::InvalidRequest(msg.to_string())
    }
}
