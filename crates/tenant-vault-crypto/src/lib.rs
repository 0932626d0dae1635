//! # tenant-vault-crypto
//!
//! Password hashing primitives for tenant-vault.
//!
//! Credential secrets are never stored in recoverable form. This crate wraps
//! Argon2id behind two calls, `hash_password` and `verify_password`, and owns
//! the cost parameters used in production.
//!
//! ## Security Properties
//!
//! - Salted, memory-hard hashing (Argon2id, PHC string output)
//! - Verification reads parameters from the stored hash, so older hashes keep
//!   verifying after a parameter change
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod errors;
pub mod hashing;

pub use constants::*;
pub use errors::{CryptoError, Result};
pub use hashing::*;
