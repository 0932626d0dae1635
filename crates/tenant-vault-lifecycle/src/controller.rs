//! Scope creation and deletion with convergence waits.

use crate::{
    config::LifecycleConfig,
    errors::{LifecycleError, Result},
    poll::{poll_until, PollOutcome},
};
use std::sync::Arc;
use std::time::Duration;
use tenant_vault_backend::{ResourceBackend, ScopePhase};
use tracing::{debug, info, warn};

/// Lifecycle controller over a shared backend handle
pub struct ScopeLifecycle<B: ResourceBackend + ?Sized> {
    backend: Arc<B>,
    config: LifecycleConfig,
}

impl<B: ResourceBackend + ?Sized> ScopeLifecycle<B> {
    pub fn new(backend: Arc<B>, config: LifecycleConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create a scope and wait until the backend reports it `Active`.
    ///
    /// An existing scope is not an error, so an interrupted registration can
    /// be retried. `NotFound` and `Transient` reads while waiting are treated
    /// as "not yet"; any other backend error ends the wait.
    pub async fn create_scope_and_await_ready(&self, scope: &str, timeout: Duration) -> Result<()> {
        match self.backend.create_scope(scope).await {
            Ok(()) => debug!(scope, "Scope creation accepted"),
            Err(e) if e.is_already_exists() => debug!(scope, "Scope already exists"),
            Err(e) => return Err(e.into()),
        }

        let outcome = poll_until(self.config.poll_interval, timeout, || async move {
            match self.backend.get_scope(scope).await {
                Ok(info) if info.phase == ScopePhase::Active => Ok(Some(())),
                Ok(info) => {
                    debug!(scope, phase = %info.phase, "Waiting for scope");
                    Ok(None)
                }
                Err(e) if e.is_not_found() || e.is_transient() => {
                    debug!(scope, error = %e, "Scope read failed, retrying");
                    Ok(None)
                }
                Err(e) => Err(LifecycleError::from(e)),
            }
        })
        .await?;

        match outcome {
            PollOutcome::Ready(()) => {
                info!(scope, "Scope active");
                Ok(())
            }
            PollOutcome::TimedOut { waited } => {
                warn!(scope, ?waited, "Scope did not become active");
                Err(LifecycleError::NotReady {
                    scope: scope.to_string(),
                    waited,
                })
            }
        }
    }

    /// Delete a scope and wait until the backend no longer returns it.
    ///
    /// A scope that outlives `timeout` has its finalizers cleared through the
    /// finalize update and gets one more window of `finalize_timeout`. A scope
    /// that is already gone counts as deleted at every step.
    pub async fn delete_scope_and_await_removed(&self, scope: &str, timeout: Duration) -> Result<()> {
        match self.backend.delete_scope(scope).await {
            Ok(()) => debug!(scope, "Scope deletion accepted"),
            Err(e) if e.is_not_found() => {
                debug!(scope, "Scope already absent");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        if let PollOutcome::Ready(()) = self.await_removed(scope, timeout).await? {
            info!(scope, "Scope removed");
            return Ok(());
        }

        // Clearing the finalizer list drops the scope even if dependents remain.
        warn!(scope, ?timeout, "Scope stuck terminating, forcing finalization");

        let mut info = match self.backend.get_scope(scope).await {
            Ok(info) => info,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        info.finalizers.clear();
        match self.backend.finalize_scope(&info).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        match self.await_removed(scope, self.config.finalize_timeout).await? {
            PollOutcome::Ready(()) => {
                info!(scope, "Scope removed after forced finalization");
                Ok(())
            }
            PollOutcome::TimedOut { waited } => {
                warn!(scope, ?waited, "Scope still present after forced finalization");
                Err(LifecycleError::StuckResource {
                    scope: scope.to_string(),
                })
            }
        }
    }

    async fn await_removed(&self, scope: &str, timeout: Duration) -> Result<PollOutcome<()>> {
        poll_until(self.config.poll_interval, timeout, || async move {
            match self.backend.get_scope(scope).await {
                Ok(info) => {
                    debug!(scope, phase = %info.phase, "Waiting for scope removal");
                    Ok(None)
                }
                Err(e) if e.is_not_found() => Ok(Some(())),
                Err(e) if e.is_transient() => {
                    debug!(scope, error = %e, "Scope read failed, retrying");
                    Ok(None)
                }
                Err(e) => Err(LifecycleError::from(e)),
            }
        })
        .await
    }
}

impl<B: ResourceBackend + ?Sized> Clone for ScopeLifecycle<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config,
        }
    }
}
