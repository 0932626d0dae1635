//! Registration, login, password change and account deletion.

use crate::{errors::*, identity::*, traits::SecretHasher, types::*};
use tenant_vault_backend::ResourceBackend;
use tenant_vault_sessions::{Clock, IssuedToken, VerifiedIdentity};
use tracing::{debug, info, warn};

use super::VaultService;

const DUMMY_SECRET: &str = "tenant-vault-dummy-secret";

impl<B, H, C> VaultService<B, H, C>
where
    B: ResourceBackend + ?Sized,
    H: SecretHasher,
    C: Clock,
{
    /// Create the identity's scope, wait for it, then write the credential record.
    ///
    /// A scope left behind by an interrupted registration is reused.
    pub(crate) async fn register_internal(&self, identity: &str, secret: &str) -> Result<()> {
        validate_identity(identity)?;
        if secret.is_empty() {
            return Err(VaultError::InvalidInput("password must not be empty".to_string()));
        }

        let scope = scope_name(identity);
        info!(identity, scope = %scope, "Registering identity");

        self.lifecycle
            .create_scope_and_await_ready(&scope, self.lifecycle.config().create_timeout)
            .await?;

        match self.backend.get_secret(&scope, CREDENTIALS_SECRET).await {
            Ok(existing) => {
                let stored = existing.get(USERNAME_FIELD).map(String::as_str);
                if stored != Some(identity) {
                    warn!(identity, scope = %scope, "Credential record belongs to another username");
                }
                return Err(VaultError::Conflict(format!("user {} already exists", identity)));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let record = CredentialRecord {
            username: identity.to_string(),
            password_hash: self.hasher.hash(secret).await?,
        };

        match self
            .backend
            .create_secret(&scope, CREDENTIALS_SECRET, &record.to_data())
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {
                return Err(VaultError::Conflict(format!("user {} already exists", identity)));
            }
            Err(e) => return Err(e.into()),
        }

        info!(identity, "Identity registered");
        Ok(())
    }

    /// Check a username and password and issue a token.
    ///
    /// Every failure that depends on the identity's state yields the same
    /// `Unauthorized` message. When no record exists a dummy digest is still
    /// verified.
    pub(crate) async fn authenticate_internal(
        &self,
        identity: &str,
        secret: &str,
    ) -> Result<IssuedToken> {
        let record = match self.load_credentials(identity).await? {
            Some(record) => record,
            None => {
                debug!(identity, "No credential record for login attempt");
                self.burn_dummy_verify(secret).await;
                return Err(VaultError::invalid_credentials());
            }
        };

        let matches = match self.hasher.verify(&record.password_hash, secret).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(identity, error = %e, "Stored credential hash unusable");
                false
            }
        };

        if !matches || record.username != identity {
            debug!(identity, "Login rejected");
            return Err(VaultError::invalid_credentials());
        }

        let issued = self.codec.issue(identity, self.config.token_ttl)?;
        info!(identity, expires_at = issued.expires_at, "Issued token");
        Ok(issued)
    }

    pub(crate) fn verify_token_internal(&self, token: &str) -> Result<VerifiedIdentity> {
        self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            VaultError::from(e)
        })
    }

    /// Re-hash the password, keeping every other field of the record.
    pub(crate) async fn change_secret_internal(
        &self,
        identity: &VerifiedIdentity,
        new_secret: &str,
    ) -> Result<()> {
        if new_secret.is_empty() {
            return Err(VaultError::InvalidInput("new password must not be empty".to_string()));
        }

        let scope = scope_name(identity.as_str());
        let mut data = match self.backend.get_secret(&scope, CREDENTIALS_SECRET).await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => return Err(VaultError::invalid_credentials()),
            Err(e) => return Err(e.into()),
        };

        let digest = self.hasher.hash(new_secret).await?;
        data.insert(PASSWORD_FIELD.to_string(), digest);

        match self
            .backend
            .update_secret(&scope, CREDENTIALS_SECRET, &data)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Err(VaultError::invalid_credentials()),
            Err(e) => return Err(e.into()),
        }

        info!(identity = %identity, "Password changed");
        Ok(())
    }

    /// Delete the identity's scope and wait until it is gone.
    pub(crate) async fn delete_identity_internal(&self, identity: &VerifiedIdentity) -> Result<()> {
        let scope = scope_name(identity.as_str());
        info!(identity = %identity, scope = %scope, "Deleting identity");

        self.lifecycle
            .delete_scope_and_await_removed(&scope, self.lifecycle.config().delete_timeout)
            .await?;

        info!(identity = %identity, "Identity deleted");
        Ok(())
    }

    /// Credential record for `identity`, or `None` if there is no usable one
    async fn load_credentials(&self, identity: &str) -> Result<Option<CredentialRecord>> {
        if validate_identity(identity).is_err() {
            return Ok(None);
        }

        let scope = scope_name(identity);
        match self.backend.get_secret(&scope, CREDENTIALS_SECRET).await {
            Ok(data) => {
                let record = CredentialRecord::from_data(&data);
                if record.is_none() {
                    warn!(identity, "Malformed credential record");
                }
                Ok(record)
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn burn_dummy_verify(&self, secret: &str) {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hasher.hash(DUMMY_SECRET))
            .await;

        match digest {
            Ok(digest) => {
                let _ = self.hasher.verify(digest, secret).await;
            }
            Err(e) => warn!(error = %e, "Failed to prepare dummy digest"),
        }
    }
}
