//! Test fixtures for lifecycle tests.

use crate::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tenant_vault_backend::{
    BackendError, MemoryBackend, MemoryBackendOptions, ResourceBackend, ScopeInfo, SecretData,
};

pub fn create_test_lifecycle(
    options: MemoryBackendOptions,
) -> (ScopeLifecycle<MemoryBackend>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_options(options));
    let lifecycle = ScopeLifecycle::new(Arc::clone(&backend), LifecycleConfig::default());
    (lifecycle, backend)
}

/// Backend whose scope reads fail transiently a fixed number of times
pub struct FlakyReads {
    pub inner: MemoryBackend,
    pub failing_reads: AtomicU32,
}

impl FlakyReads {
    pub fn new(failing_reads: u32) -> Self {
        Self {
            inner: MemoryBackend::new(),
            failing_reads: AtomicU32::new(failing_reads),
        }
    }
}

#[async_trait]
impl ResourceBackend for FlakyReads {
    async fn create_secret(
        &self,
        scope: &str,
        name: &str,
        data: &SecretData,
    ) -> tenant_vault_backend::Result<()> {
        self.inner.create_secret(scope, name, data).await
    }

    async fn get_secret(&self, scope: &str, name: &str) -> tenant_vault_backend::Result<SecretData> {
        self.inner.get_secret(scope, name).await
    }

    async fn update_secret(
        &self,
        scope: &str,
        name: &str,
        data: &SecretData,
    ) -> tenant_vault_backend::Result<()> {
        self.inner.update_secret(scope, name, data).await
    }

    async fn delete_secret(&self, scope: &str, name: &str) -> tenant_vault_backend::Result<()> {
        self.inner.delete_secret(scope, name).await
    }

    async fn list_secrets(&self, scope: &str) -> tenant_vault_backend::Result<Vec<String>> {
        self.inner.list_secrets(scope).await
    }

    async fn create_scope(&self, name: &str) -> tenant_vault_backend::Result<()> {
        self.inner.create_scope(name).await
    }

    async fn get_scope(&self, name: &str) -> tenant_vault_backend::Result<ScopeInfo> {
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Transient("connection reset".to_string()));
        }
        self.inner.get_scope(name).await
    }

    async fn delete_scope(&self, name: &str) -> tenant_vault_backend::Result<()> {
        self.inner.delete_scope(name).await
    }

    async fn finalize_scope(&self, scope: &ScopeInfo) -> tenant_vault_backend::Result<()> {
        self.inner.finalize_scope(scope).await
    }
}
