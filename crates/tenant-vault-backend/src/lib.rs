//! # tenant-vault-backend
//!
//! Client layer for the shared cluster resource backend.
//!
//! Two resource kinds are addressed: scopes (Kubernetes namespaces), which
//! carry an observable phase and a finalizer list, and key/value secrets
//! living inside a scope. Every operation is a single request; waiting for
//! convergence is left to the lifecycle controller.
//!
//! Implementations:
//! - [`KubeBackend`] talks to the Kubernetes REST API.
//! - [`MemoryBackend`] simulates the backend's asynchronous behavior in
//!   process, for tests and local development.

#![warn(clippy::all)]

pub mod errors;
pub mod kube;
mod kubeconfig;
pub mod memory;
pub mod traits;
pub mod types;

pub use errors::{BackendError, Result};
pub use kube::{KubeAuth, KubeBackend, KubeConfig};
pub use memory::{MemoryBackend, MemoryBackendOptions};
pub use traits::ResourceBackend;
pub use types::*;
