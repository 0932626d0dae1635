//! Secret hashing using Argon2id.

use crate::{constants::*, errors::*};
use argon2::password_hash::SaltString;
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;
use zeroize::Zeroize;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_cost: argon2_params::MEMORY_COST,
            time_cost: argon2_params::TIME_COST,
            parallelism: argon2_params::PARALLELISM,
        }
    }
}

impl HashingParams {
    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(argon2_params::OUTPUT_LENGTH),
        )
        .map_err(|e| CryptoError::InvalidParams(e.to_string()))
    }
}

/// Hash a password using Argon2id
///
/// # Returns
///
/// PHC-formatted hash string that includes algorithm, parameters, salt, and hash
pub fn hash_password(password: &[u8], salt: &SaltString, params: &HashingParams) -> Result<String> {
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2_params::VERSION,
        params.to_argon2()?,
    );

    let password_hash = argon2
        .hash_password(password, salt)
        .map_err(|e| CryptoError::Argon2Failed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against an Argon2id hash
///
/// Parameters are taken from the PHC string, not from the current defaults.
///
/// # Returns
///
/// `Ok(())` if password matches, `Err(PasswordMismatch)` if it does not
pub fn verify_password(password: &[u8], hash_str: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash_str).map_err(|_| CryptoError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password, &parsed_hash)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => CryptoError::PasswordMismatch,
            other => CryptoError::Argon2Failed(other.to_string()),
        })
}

/// Generate a random salt for password hashing
pub fn generate_salt() -> Result<SaltString> {
    let mut bytes = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|e| CryptoError::Argon2Failed(e.to_string()));
    bytes.zeroize();
    salt
}
