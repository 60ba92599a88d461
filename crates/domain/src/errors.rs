//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OpsBoard
///
/// Remote errors carry the failure class the UI reacts to: a failed fetch
/// leaves the previous view intact, a failed mutation is rolled back and
/// reported. Nothing here is fatal.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OpsBoardError {
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Remote mutation failed: {0}")]
    RemoteMutation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for OpsBoard operations
pub type Result<T> = std::result::Result<T, OpsBoardError>;
