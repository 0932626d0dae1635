//! Test fixtures for vault service tests.

use crate::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tenant_vault_backend::{MemoryBackend, MemoryBackendOptions};
use tenant_vault_crypto::HashingParams;
use tenant_vault_sessions::{Algorithm, ManualClock, TokenCodec, VerifiedIdentity};

pub const TEST_KEY: [u8; 32] = [42u8; 32];
pub const TEST_ISSUER: &str = "tenant-vault.test";
pub const START_MILLIS: u64 = 1_700_000_000_000;

/// Argon2 hasher with minimum cost that counts its calls
pub struct CountingHasher {
    inner: Argon2Hasher,
    pub hashes: AtomicU32,
    pub verifies: AtomicU32,
}

impl CountingHasher {
    pub fn new() -> Self {
        Self {
            inner: Argon2Hasher::new(HashingParams {
                memory_cost: 8,
                time_cost: 1,
                parallelism: 1,
            }),
            hashes: AtomicU32::new(0),
            verifies: AtomicU32::new(0),
        }
    }

    pub fn verify_count(&self) -> u32 {
        self.verifies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretHasher for CountingHasher {
    async fn hash(&self, secret: &str) -> Result<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        self.inner.hash(secret).await
    }

    async fn verify(&self, digest: &str, secret: &str) -> Result<bool> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(digest, secret).await
    }
}

pub type TestVault = VaultService<MemoryBackend, CountingHasher, ManualClock>;

pub struct Harness {
    pub vault: TestVault,
    pub backend: Arc<MemoryBackend>,
    pub clock: ManualClock,
}

/// Helper to create a vault over an immediately converging backend
pub fn create_test_vault() -> Harness {
    create_test_vault_with(MemoryBackendOptions::default())
}

pub fn create_test_vault_with(options: MemoryBackendOptions) -> Harness {
    let backend = Arc::new(MemoryBackend::with_options(options));
    let clock = ManualClock::new(START_MILLIS);
    let codec = TokenCodec::new(
        &TEST_KEY,
        Algorithm::HS256,
        TEST_ISSUER.to_string(),
        clock.clone(),
    )
    .unwrap();

    let vault = VaultService::new(
        Arc::clone(&backend),
        codec,
        CountingHasher::new(),
        VaultConfig::default(),
    );

    Harness {
        vault,
        backend,
        clock,
    }
}

/// Register, log in and verify the token, returning the proven identity
pub async fn register_and_login(vault: &TestVault, identity: &str, secret: &str) -> VerifiedIdentity {
    vault.register(identity, secret).await.unwrap();
    let issued = vault.authenticate(identity, secret).await.unwrap();
    vault.verify_token(&issued.token).await.unwrap()
}

pub fn data(pairs: &[(&str, &str)]) -> SecretData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
