//! In-process backend simulation.
//!
//! Reproduces the convergence behavior the lifecycle controller has to cope
//! with: scopes start `Pending` and only report `Active` after a number of
//! reads, deleted scopes linger in `Terminating`, and finalizers can pin a
//! terminating scope until a finalize update clears them.

use crate::{
    errors::{BackendError, Result},
    traits::ResourceBackend,
    types::*,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Finalizer the simulated backend attaches to every scope
pub const DEFAULT_FINALIZER: &str = "kubernetes";

/// Convergence knobs for [`MemoryBackend`]
#[derive(Debug, Clone, Default)]
pub struct MemoryBackendOptions {
    /// Reads that observe `Pending` before a new scope turns `Active`
    pub activation_polls: u32,
    /// Reads that observe `Terminating` before a deleted scope disappears
    pub removal_polls: u32,
    /// Terminating scopes stay until a finalize update clears their finalizers
    pub stuck_finalizers: bool,
    /// Finalize updates are accepted but have no effect
    pub ignore_finalize: bool,
}

#[derive(Debug)]
struct ScopeEntry {
    phase: ScopePhase,
    finalizers: Vec<String>,
    countdown: u32,
    secrets: BTreeMap<String, SecretData>,
}

/// In-memory [`ResourceBackend`]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    scopes: RwLock<HashMap<String, ScopeEntry>>,
    options: MemoryBackendOptions,
    pending_failures: AtomicU32,
    finalize_calls: AtomicU32,
}

impl MemoryBackend {
    /// Backend whose scopes converge immediately
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MemoryBackendOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Make the next `count` calls fail with `Transient`
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of finalize updates received
    pub fn finalize_calls(&self) -> u32 {
        self.finalize_calls.load(Ordering::SeqCst)
    }

    /// Whether a scope exists in any phase, without advancing the simulation
    pub async fn contains_scope(&self, name: &str) -> bool {
        self.scopes.read().await.contains_key(name)
    }

    /// Number of scopes in any phase
    pub async fn scope_count(&self) -> usize {
        self.scopes.read().await.len()
    }

    fn take_failure(&self) -> Result<()> {
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if injected {
            return Err(BackendError::Transient(
                "injected transient failure".to_string(),
            ));
        }
        Ok(())
    }

    fn scope_missing(name: &str) -> BackendError {
        BackendError::NotFound(format!("scope {}", name))
    }

    fn secret_missing(scope: &str, name: &str) -> BackendError {
        BackendError::NotFound(format!("secret {}/{}", scope, name))
    }

    fn blocked_by_finalizers(&self, entry: &ScopeEntry) -> bool {
        self.options.stuck_finalizers && !entry.finalizers.is_empty()
    }
}

#[async_trait]
impl ResourceBackend for MemoryBackend {
    async fn create_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        let entry = scopes.get_mut(scope).ok_or_else(|| Self::scope_missing(scope))?;

        if entry.phase == ScopePhase::Terminating {
            return Err(BackendError::Rejected {
                status: 403,
                message: format!("scope {} is being terminated", scope),
            });
        }

        if entry.secrets.contains_key(name) {
            return Err(BackendError::AlreadyExists(format!("secret {}/{}", scope, name)));
        }

        entry.secrets.insert(name.to_string(), data.clone());
        debug!(scope, secret = name, "Created secret");
        Ok(())
    }

    async fn get_secret(&self, scope: &str, name: &str) -> Result<SecretData> {
        self.take_failure()?;
        let scopes = self.scopes.read().await;
        scopes
            .get(scope)
            .and_then(|entry| entry.secrets.get(name))
            .cloned()
            .ok_or_else(|| Self::secret_missing(scope, name))
    }

    async fn update_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        let slot = scopes
            .get_mut(scope)
            .and_then(|entry| entry.secrets.get_mut(name))
            .ok_or_else(|| Self::secret_missing(scope, name))?;

        *slot = data.clone();
        debug!(scope, secret = name, "Replaced secret");
        Ok(())
    }

    async fn delete_secret(&self, scope: &str, name: &str) -> Result<()> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        scopes
            .get_mut(scope)
            .and_then(|entry| entry.secrets.remove(name))
            .map(|_| ())
            .ok_or_else(|| Self::secret_missing(scope, name))
    }

    async fn list_secrets(&self, scope: &str) -> Result<Vec<String>> {
        self.take_failure()?;
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(scope)
            .map(|entry| entry.secrets.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_scope(&self, name: &str) -> Result<()> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        if scopes.contains_key(name) {
            return Err(BackendError::AlreadyExists(format!("scope {}", name)));
        }

        let phase = if self.options.activation_polls == 0 {
            ScopePhase::Active
        } else {
            ScopePhase::Pending
        };

        scopes.insert(
            name.to_string(),
            ScopeEntry {
                phase,
                finalizers: vec![DEFAULT_FINALIZER.to_string()],
                countdown: self.options.activation_polls,
                secrets: BTreeMap::new(),
            },
        );
        debug!(scope = name, %phase, "Created scope");
        Ok(())
    }

    async fn get_scope(&self, name: &str) -> Result<ScopeInfo> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        let entry = scopes.get_mut(name).ok_or_else(|| Self::scope_missing(name))?;
        let stuck = self.blocked_by_finalizers(entry);

        match entry.phase {
            ScopePhase::Pending => {
                entry.countdown = entry.countdown.saturating_sub(1);
                if entry.countdown == 0 {
                    entry.phase = ScopePhase::Active;
                }
            }
            ScopePhase::Terminating if !stuck => {
                if entry.countdown == 0 {
                    scopes.remove(name);
                    debug!(scope = name, "Scope removed");
                    return Err(Self::scope_missing(name));
                }
                entry.countdown -= 1;
            }
            _ => {}
        }

        Ok(ScopeInfo {
            name: name.to_string(),
            phase: entry.phase,
            finalizers: entry.finalizers.clone(),
        })
    }

    async fn delete_scope(&self, name: &str) -> Result<()> {
        self.take_failure()?;
        let mut scopes = self.scopes.write().await;
        let entry = scopes.get_mut(name).ok_or_else(|| Self::scope_missing(name))?;

        if entry.phase != ScopePhase::Terminating {
            entry.phase = ScopePhase::Terminating;
            entry.countdown = self.options.removal_polls;
        }
        debug!(scope = name, "Scope deletion accepted");
        Ok(())
    }

    async fn finalize_scope(&self, scope: &ScopeInfo) -> Result<()> {
        self.take_failure()?;
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        let mut scopes = self.scopes.write().await;
        let entry = scopes
            .get_mut(&scope.name)
            .ok_or_else(|| Self::scope_missing(&scope.name))?;

        if self.options.ignore_finalize {
            debug!(scope = %scope.name, "Finalize update ignored");
            return Ok(());
        }

        entry.finalizers = scope.finalizers.clone();
        if entry.phase == ScopePhase::Terminating && entry.finalizers.is_empty() {
            entry.countdown = 0;
        }
        debug!(scope = %scope.name, finalizers = ?entry.finalizers, "Finalize update applied");
        Ok(())
    }
}
