//! Backend error types.

use thiserror::Error;

/// Backend operation errors
///
/// `Transient` is the only retry-worthy kind. `NotFound` and `AlreadyExists`
/// are terminal answers about the addressed resource.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Addressed resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource with that name already exists
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Network failure, throttling or server-side error
    #[error("Transient backend error: {0}")]
    Transient(String),

    /// Backend refused the request
    #[error("Request rejected by backend: status={status}, message={message}")]
    Rejected { status: u16, message: String },

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Client could not be configured
    #[error("Backend configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, BackendError::AlreadyExists(_))
    }
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
