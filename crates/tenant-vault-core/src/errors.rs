//! Vault error taxonomy.

use std::time::Duration;
use tenant_vault_backend::BackendError;
use tenant_vault_crypto::CryptoError;
use tenant_vault_lifecycle::LifecycleError;
use tenant_vault_sessions::TokenError;
use thiserror::Error;

/// Message returned for every failed login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Orchestrator errors
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller is not (or no longer) a known identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity or secret already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Scope did not become usable in time
    #[error("Scope {scope} not ready after {waited:?}")]
    NotReady { scope: String, waited: Duration },

    /// Scope could not be removed, even after forced finalization
    #[error("Scope {scope} stuck in deletion")]
    StuckResource { scope: String },

    /// Addressed secret does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend temporarily unavailable
    #[error("Transient backend failure: {0}")]
    Transient(String),

    /// Request failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    pub(crate) fn invalid_credentials() -> Self {
        VaultError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }
}

impl From<BackendError> for VaultError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(resource) => VaultError::NotFound(resource),
            BackendError::AlreadyExists(resource) => VaultError::Conflict(resource),
            BackendError::Transient(reason) => VaultError::Transient(reason),
            BackendError::Rejected { status, message } if status == 400 || status == 422 => {
                VaultError::InvalidInput(message)
            }
            other => VaultError::Internal(other.to_string()),
        }
    }
}

impl From<LifecycleError> for VaultError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotReady { scope, waited } => VaultError::NotReady { scope, waited },
            LifecycleError::StuckResource { scope } => VaultError::StuckResource { scope },
            LifecycleError::Backend(e) => e.into(),
        }
    }
}

impl From<TokenError> for VaultError {
    fn from(err: TokenError) -> Self {
        if err.is_rejection() {
            VaultError::Unauthorized(err.to_string())
        } else {
            VaultError::Internal(err.to_string())
        }
    }
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        VaultError::Internal(err.to_string())
    }
}

/// Result type for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;
