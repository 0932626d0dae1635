//! Identity and secret naming rules.

use crate::errors::{Result, VaultError};

/// Prefix turning an identity into its scope name
pub const SCOPE_PREFIX: &str = "user-";

/// Reserved secret holding an identity's credential record
pub const CREDENTIALS_SECRET: &str = "credentials";

/// Longest identity whose scope name is still a DNS-1123 label
pub const MAX_IDENTITY_LENGTH: usize = 57;

/// Longest secret name (DNS-1123 subdomain)
pub const MAX_SECRET_NAME_LENGTH: usize = 253;

/// Longest key inside a secret's data
pub const MAX_DATA_KEY_LENGTH: usize = 253;

/// Scope owned by `identity`
pub fn scope_name(identity: &str) -> String {
    format!("{}{}", SCOPE_PREFIX, identity)
}

/// Check that `identity` is lowercase alphanumerics and `-`, starting and
/// ending with an alphanumeric, and short enough for its scope name.
pub fn validate_identity(identity: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(VaultError::InvalidInput("username must not be empty".to_string()));
    }

    if identity.len() > MAX_IDENTITY_LENGTH {
        return Err(VaultError::InvalidInput(format!(
            "username must be at most {} characters",
            MAX_IDENTITY_LENGTH
        )));
    }

    let valid_chars = identity
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_chars || !alphanumeric_edges(identity) {
        return Err(VaultError::InvalidInput(
            "username may only contain lowercase letters, digits and '-', \
             and must start and end with a letter or digit"
                .to_string(),
        ));
    }

    Ok(())
}

/// Check that `name` is a usable, non-reserved secret name.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name == CREDENTIALS_SECRET {
        return Err(VaultError::InvalidInput(format!(
            "secret name '{}' is reserved",
            CREDENTIALS_SECRET
        )));
    }

    if name.is_empty() || name.len() > MAX_SECRET_NAME_LENGTH {
        return Err(VaultError::InvalidInput(format!(
            "secret name must be 1 to {} characters",
            MAX_SECRET_NAME_LENGTH
        )));
    }

    let valid_chars = name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.');
    if !valid_chars || !alphanumeric_edges(name) {
        return Err(VaultError::InvalidInput(
            "secret name may only contain lowercase letters, digits, '-' and '.', \
             and must start and end with a letter or digit"
                .to_string(),
        ));
    }

    Ok(())
}

/// Check a secret data key: letters, digits, `-`, `_` and `.`.
pub fn validate_data_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_DATA_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.');

    if !valid {
        return Err(VaultError::InvalidInput(format!("invalid data key '{}'", key)));
    }
    Ok(())
}

fn alphanumeric_edges(s: &str) -> bool {
    let edge = |b: Option<&u8>| b.is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    edge(s.as_bytes().first()) && edge(s.as_bytes().last())
}
