//! Lifecycle error types.

use std::time::Duration;
use tenant_vault_backend::BackendError;
use thiserror::Error;

/// Lifecycle controller errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Scope was not observed active before the deadline
    #[error("Scope {scope} not ready after {waited:?}")]
    NotReady { scope: String, waited: Duration },

    /// Scope still present after forced finalization
    #[error("Scope {scope} stuck in deletion")]
    StuckResource { scope: String },

    /// Backend error that polling does not absorb
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
