//! # tenant-vault-lifecycle
//!
//! Drives scope creation and deletion against a backend that only accepts
//! requests and converges later.
//!
//! - [`ScopeLifecycle::create_scope_and_await_ready`] returns once the scope
//!   is observed `Active`.
//! - [`ScopeLifecycle::delete_scope_and_await_removed`] returns once the scope
//!   is gone, forcing finalization if it stalls in `Terminating`.
//!
//! Both are bounded by deadlines from [`LifecycleConfig`]; running out of time
//! is a terminal [`LifecycleError`], never a silent success.

#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod errors;
pub mod poll;

pub use config::LifecycleConfig;
pub use controller::ScopeLifecycle;
pub use errors::{LifecycleError, Result};
pub use poll::{poll_until, PollOutcome};
