use thiserror::Error;

/// Errors surfaced by playlist-scoped operations and export dispatch.
///
/// Cache failures never show up here, they are absorbed by the cache layer.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Broker error: {0}")]
    Broker(anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlaylistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlaylistError::NotFound(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, PlaylistError::Forbidden(_))
    }
}
