//! Vault data types.

use std::time::Duration;
use tenant_vault_lifecycle::LifecycleConfig;

pub use tenant_vault_backend::SecretData;

/// Credential record field holding the identity name
pub const USERNAME_FIELD: &str = "username";

/// Credential record field holding the PHC hash
pub const PASSWORD_FIELD: &str = "password";

/// Orchestrator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultConfig {
    /// Lifetime of tokens issued at login
    pub token_ttl: Duration,
    pub lifecycle: LifecycleConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(24 * 60 * 60),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

/// Parsed credential record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

impl CredentialRecord {
    /// Read a record from secret data; `None` if a field is missing
    pub fn from_data(data: &SecretData) -> Option<Self> {
        Some(Self {
            username: data.get(USERNAME_FIELD)?.clone(),
            password_hash: data.get(PASSWORD_FIELD)?.clone(),
        })
    }

    pub fn to_data(&self) -> SecretData {
        let mut data = SecretData::new();
        data.insert(USERNAME_FIELD.to_string(), self.username.clone());
        data.insert(PASSWORD_FIELD.to_string(), self.password_hash.clone());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_record_fields() {
        let record = CredentialRecord {
            username: "alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };

        let data = record.to_data();
        assert_eq!(data.get("username").map(String::as_str), Some("alice"));
        assert_eq!(CredentialRecord::from_data(&data), Some(record));
    }

    #[test]
    fn test_credential_record_requires_both_fields() {
        let mut data = SecretData::new();
        data.insert(USERNAME_FIELD.to_string(), "alice".to_string());
        assert_eq!(CredentialRecord::from_data(&data), None);
    }
}
