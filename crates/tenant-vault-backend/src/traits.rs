//! Backend trait definitions.

use crate::{errors::Result, types::*};
use async_trait::async_trait;

/// Resource backend interface
///
/// Each call maps to one backend request. Scope creation and deletion are
/// asynchronous on the backend side: success means the request was accepted,
/// not that the scope is usable or gone.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Create a secret in a scope
    ///
    /// Fails with `AlreadyExists` if the name is taken and `NotFound` if the
    /// scope does not exist.
    async fn create_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()>;

    /// Read a secret's decoded key/value data
    async fn get_secret(&self, scope: &str, name: &str) -> Result<SecretData>;

    /// Replace a secret's data entirely (no merge)
    async fn update_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()>;

    /// Delete a secret
    async fn delete_secret(&self, scope: &str, name: &str) -> Result<()>;

    /// List secret names in a scope
    ///
    /// A scope that does not exist lists as empty.
    async fn list_secrets(&self, scope: &str) -> Result<Vec<String>>;

    /// Request creation of a scope
    async fn create_scope(&self, name: &str) -> Result<()>;

    /// Read a scope's phase and finalizers
    async fn get_scope(&self, name: &str) -> Result<ScopeInfo>;

    /// Request deletion of a scope
    async fn delete_scope(&self, name: &str) -> Result<()>;

    /// Submit a finalize update carrying `scope.finalizers`
    ///
    /// Used to force removal of a scope stuck in `Terminating` by sending an
    /// empty finalizer list.
    async fn finalize_scope(&self, scope: &ScopeInfo) -> Result<()>;
}
