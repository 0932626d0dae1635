//! Cryptographic error types.

use thiserror::Error;

/// Hashing operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Argon2 parameters rejected
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Argon2 hashing failed
    #[error("Argon2 hashing failed: {0}")]
    Argon2Failed(String),

    /// Stored hash is not a PHC string
    #[error("Invalid hash format")]
    InvalidHashFormat,

    /// Secret did not match the stored hash
    #[error("Password mismatch")]
    PasswordMismatch,
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
