//! Secret CRUD within the caller's own scope.

use crate::{errors::*, identity::*, traits::SecretHasher, types::*};
use tenant_vault_backend::{BackendError, ResourceBackend};
use tenant_vault_sessions::{Clock, VerifiedIdentity};
use tracing::{debug, info};

use super::VaultService;

impl<B, H, C> VaultService<B, H, C>
where
    B: ResourceBackend + ?Sized,
    H: SecretHasher,
    C: Clock,
{
    pub(crate) async fn put_secret_internal(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
        data: SecretData,
    ) -> Result<()> {
        validate_secret_name(name)?;
        validate_data(&data)?;

        let scope = scope_name(identity.as_str());
        match self.backend.create_secret(&scope, name, &data).await {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {
                return Err(VaultError::Conflict(format!("secret {} already exists", name)));
            }
            Err(e) => return Err(self.resolve_missing(&scope, name, e).await),
        }

        info!(identity = %identity, secret = name, "Secret created");
        Ok(())
    }

    pub(crate) async fn get_secret_internal(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
    ) -> Result<SecretData> {
        validate_secret_name(name)?;

        let scope = scope_name(identity.as_str());
        match self.backend.get_secret(&scope, name).await {
            Ok(data) => Ok(data),
            Err(e) => Err(self.resolve_missing(&scope, name, e).await),
        }
    }

    pub(crate) async fn update_secret_internal(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
        data: SecretData,
    ) -> Result<()> {
        validate_secret_name(name)?;
        validate_data(&data)?;

        let scope = scope_name(identity.as_str());
        if let Err(e) = self.backend.update_secret(&scope, name, &data).await {
            return Err(self.resolve_missing(&scope, name, e).await);
        }

        info!(identity = %identity, secret = name, "Secret replaced");
        Ok(())
    }

    pub(crate) async fn delete_secret_internal(
        &self,
        identity: &VerifiedIdentity,
        name: &str,
    ) -> Result<()> {
        validate_secret_name(name)?;

        let scope = scope_name(identity.as_str());
        if let Err(e) = self.backend.delete_secret(&scope, name).await {
            return Err(self.resolve_missing(&scope, name, e).await);
        }

        info!(identity = %identity, secret = name, "Secret deleted");
        Ok(())
    }

    pub(crate) async fn list_secrets_internal(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<Vec<String>> {
        let scope = scope_name(identity.as_str());

        // Listing an absent scope succeeds with no items, so check it exists
        match self.backend.get_scope(&scope).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Err(self.scope_gone(identity.as_str())),
            Err(e) => return Err(e.into()),
        }

        let mut names: Vec<String> = self
            .backend
            .list_secrets(&scope)
            .await?
            .into_iter()
            .filter(|n| n != CREDENTIALS_SECRET)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Turn a `NotFound` into `Unauthorized` when the whole scope is gone and
    /// into a secret-level `NotFound` otherwise.
    async fn resolve_missing(&self, scope: &str, name: &str, err: BackendError) -> VaultError {
        if !err.is_not_found() {
            return err.into();
        }

        match self.backend.get_scope(scope).await {
            Ok(_) => VaultError::NotFound(format!("secret {}", name)),
            Err(e) if e.is_not_found() => {
                self.scope_gone(scope.strip_prefix(SCOPE_PREFIX).unwrap_or(scope))
            }
            Err(e) => e.into(),
        }
    }

    fn scope_gone(&self, identity: &str) -> VaultError {
        debug!(identity, "Token outlived its identity");
        VaultError::Unauthorized(format!("user {} no longer exists", identity))
    }
}

fn validate_data(data: &SecretData) -> Result<()> {
    data.keys().try_for_each(|key| validate_data_key(key))
}
