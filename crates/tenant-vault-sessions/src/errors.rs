use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    SigningFailure(String),

    #[error("Token TTL must be greater than zero")]
    InvalidTtl,

    #[error("Signing key too short: {actual} bytes, minimum {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid algorithm: found {found}, expected {expected}")]
    InvalidAlgorithm { found: String, expected: String },

    #[error("Malformed signature")]
    MalformedSignature,

    #[error("Invalid token")]
    Invalid,

    #[error("Token expired at {expired_at}")]
    Expired { expired_at: u64 },
}

impl TokenError {
    /// Whether the error describes a bad token rather than a codec failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            TokenError::SigningFailure(_)
                | TokenError::InvalidTtl
                | TokenError::KeyTooShort { .. }
                | TokenError::UnsupportedAlgorithm(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TokenError>;
