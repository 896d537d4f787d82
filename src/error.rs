//! Error types for star-tactics

use thiserror::Error;

/// Errors that can occur in the knowledge graph core.
///
/// Unknown-id conditions are deliberately *not* represented here: lookups
/// return `Option` and mutators return `bool` flags instead. The variants
/// below cover the durable-store failures a caller cannot ignore.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// IO error from the storage backend
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error, including a corrupt durable file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UUID parsing error
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Storage backend error not covered by the other variants
    #[error("Storage error: {0}")]
    Storage(String),
}

impl KnowledgeError {
    /// Create a generic storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Result type for knowledge graph operations
pub type Result<T> = std::result::Result<T, KnowledgeError>;
