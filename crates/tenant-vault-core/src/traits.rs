//! Vault trait definitions.

use crate::{errors::Result, types::SecretData};
use async_trait::async_trait;
use tenant_vault_sessions::{IssuedToken, VerifiedIdentity};

/// One-way secret hashing
#[async_trait]
pub trait SecretHasher: Send + Sync {
    /// Hash `secret` with a fresh salt
    async fn hash(&self, secret: &str) -> Result<String>;

    /// Check `secret` against `digest`; a mismatch is `Ok(false)`
    async fn verify(&self, digest: &str, secret: &str) -> Result<bool>;
}

/// Tenant-facing vault operations
#[async_trait]
pub trait Vault: Send + Sync {
    /// Create an identity's scope and credential record
    async fn register(&self, identity: &str, secret: &str) -> Result<()>;

    /// Check credentials and issue a token
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<IssuedToken>;

    /// Verify a token and return the identity it proves
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity>;

    /// Replace the identity's password hash
    async fn change_secret(&self, identity: &VerifiedIdentity, new_secret: &str) -> Result<()>;

    /// Remove the identity's scope with everything in it
    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<()>;

    async fn put_secret(&self, identity: &VerifiedIdentity, name: &str, data: SecretData)
        -> Result<()>;

    async fn get_secret(&self, identity: &VerifiedIdentity, name: &str) -> Result<SecretData>;

    /// Replace a secret's data entirely
    async fn update_secret(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
        data: SecretData,
    ) -> Result<()>;

    async fn delete_secret(&self, identity: &VerifiedIdentity, name: &str) -> Result<()>;

    /// Names of the identity's secrets, excluding the credential record
    async fn list_secrets(&self, identity: &VerifiedIdentity) -> Result<Vec<String>>;
}
