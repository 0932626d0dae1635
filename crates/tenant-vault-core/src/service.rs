//! Vault service implementation.

use crate::{errors::*, traits::*, types::*};
use async_trait::async_trait;
use std::sync::Arc;
use tenant_vault_backend::ResourceBackend;
use tenant_vault_lifecycle::ScopeLifecycle;
use tenant_vault_sessions::{Clock, IssuedToken, SystemClock, TokenCodec, VerifiedIdentity};
use tokio::sync::OnceCell;

mod accounts;
mod secrets;

/// Vault service over a backend, a hasher and a token codec
pub struct VaultService<B, H, C = SystemClock>
where
    B: ResourceBackend + ?Sized,
    H: SecretHasher,
    C: Clock,
{
    backend: Arc<B>,
    lifecycle: ScopeLifecycle<B>,
    codec: TokenCodec<C>,
    pub(crate) hasher: H,
    config: VaultConfig,
    /// Digest verified against when an identity has no credential record
    dummy_digest: OnceCell<String>,
}

impl<B, H, C> VaultService<B, H, C>
where
    B: ResourceBackend + ?Sized,
    H: SecretHasher,
    C: Clock,
{
    /// Create a new vault service
    pub fn new(backend: Arc<B>, codec: TokenCodec<C>, hasher: H, config: VaultConfig) -> Self {
        Self {
            lifecycle: ScopeLifecycle::new(Arc::clone(&backend), config.lifecycle),
            backend,
            codec,
            hasher,
            config,
            dummy_digest: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }
}

#[async_trait]
impl<B, H, C> Vault for VaultService<B, H, C>
where
    B: ResourceBackend + ?Sized + 'static,
    H: SecretHasher + 'static,
    C: Clock + 'static,
{
    async fn register(&self, identity: &str, secret: &str) -> Result<()> {
        self.register_internal(identity, secret).await
    }

    async fn authenticate(&self, identity: &str, secret: &str) -> Result<IssuedToken> {
        self.authenticate_internal(identity, secret).await
    }

    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity> {
        self.verify_token_internal(token)
    }

    async fn change_secret(&self, identity: &VerifiedIdentity, new_secret: &str) -> Result<()> {
        self.change_secret_internal(identity, new_secret).await
    }

    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<()> {
        self.delete_identity_internal(identity).await
    }

    async fn put_secret(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
        data: SecretData,
    ) -> Result<()> {
        self.put_secret_internal(identity, name, data).await
    }

    async fn get_secret(&self, identity: &VerifiedIdentity, name: &str) -> Result<SecretData> {
        self.get_secret_internal(identity, name).await
    }

    async fn update_secret(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
        data: SecretData,
    ) -> Result<()> {
        self.update_secret_internal(identity, name, data).await
    }

    async fn delete_secret(&self, identity: &VerifiedIdentity, name: &str) -> Result<()> {
        self.delete_secret_internal(identity, name).await
    }

    async fn list_secrets(&self, identity: &VerifiedIdentity) -> Result<Vec<String>> {
        self.list_secrets_internal(identity).await
    }
}
