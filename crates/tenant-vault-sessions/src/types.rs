use serde::{Deserialize, Serialize};
use std::fmt;

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String, // Issuer
    pub sub: String, // Subject (identity name)
    pub iat: u64,    // Issued at, seconds
    pub exp: u64,    // Expiration, seconds (rounded up)
    pub exp_ms: u64, // Expiration, milliseconds
}

/// A token handed back to the caller after login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64, // Unix seconds
    pub expires_in: u64, // Seconds until expiry
    pub token_type: String, // "Bearer"
}

/// Identity proven by a successfully verified token.
///
/// Only the token codec constructs this, so holding one means the bearer
/// presented a valid, unexpired token for a non-empty subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerifiedIdentity(String);

impl VerifiedIdentity {
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VerifiedIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
