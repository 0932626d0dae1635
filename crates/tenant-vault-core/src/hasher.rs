//! Argon2id secret hasher.

use crate::{errors::*, traits::SecretHasher};
use async_trait::async_trait;
use tenant_vault_crypto::{generate_salt, hash_password, verify_password, CryptoError, HashingParams};
use zeroize::Zeroizing;

/// [`SecretHasher`] running Argon2id on the blocking thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher {
    params: HashingParams,
}

impl Argon2Hasher {
    pub fn new(params: HashingParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl SecretHasher for Argon2Hasher {
    async fn hash(&self, secret: &str) -> Result<String> {
        let params = self.params;
        let secret = Zeroizing::new(secret.as_bytes().to_vec());

        tokio::task::spawn_blocking(move || {
            let salt = generate_salt()?;
            hash_password(&secret, &salt, &params)
        })
        .await
        .map_err(|e| VaultError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(VaultError::from)
    }

    async fn verify(&self, digest: &str, secret: &str) -> Result<bool> {
        let digest = digest.to_string();
        let secret = Zeroizing::new(secret.as_bytes().to_vec());

        let outcome = tokio::task::spawn_blocking(move || verify_password(&secret, &digest))
            .await
            .map_err(|e| VaultError::Internal(format!("hashing task failed: {}", e)))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(CryptoError::PasswordMismatch) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
