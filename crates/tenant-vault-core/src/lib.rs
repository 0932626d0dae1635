//! # tenant-vault-core
//!
//! Session and scope orchestration.
//!
//! Every tenant identity owns exactly one scope, named `user-<identity>`,
//! holding a `credentials` record (username plus Argon2id hash) and any
//! number of tenant secrets. This crate composes:
//! - the token codec, for issuing tokens on login and verifying them,
//! - the lifecycle controller, for creating and destroying scopes,
//! - the backend, for secret reads and writes.
//!
//! Operations that act on behalf of a tenant take a
//! [`VerifiedIdentity`](tenant_vault_sessions::VerifiedIdentity), which only
//! a successful token verification can produce.

#![warn(clippy::all)]

pub mod errors;
pub mod hasher;
pub mod identity;
pub mod service;
pub mod traits;
pub mod types;

pub use errors::{Result, VaultError, INVALID_CREDENTIALS};
pub use hasher::Argon2Hasher;
pub use identity::{scope_name, CREDENTIALS_SECRET, SCOPE_PREFIX};
pub use service::VaultService;
pub use traits::{SecretHasher, Vault};
pub use types::*;
