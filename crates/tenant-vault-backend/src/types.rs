//! Backend resource types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key/value payload of a secret resource
pub type SecretData = BTreeMap<String, String>;

/// Observable phase of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopePhase {
    /// Accepted but not yet reported usable
    Pending,
    /// Usable for secret operations
    Active,
    /// Deletion accepted, dependents being cleaned up
    Terminating,
}

impl ScopePhase {
    /// Map a backend phase string; anything unrecognized is still pending.
    pub fn from_phase_str(phase: Option<&str>) -> Self {
        match phase {
            Some("Active") => ScopePhase::Active,
            Some("Terminating") => ScopePhase::Terminating,
            _ => ScopePhase::Pending,
        }
    }
}

impl fmt::Display for ScopePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopePhase::Pending => "Pending",
            ScopePhase::Active => "Active",
            ScopePhase::Terminating => "Terminating",
        };
        f.write_str(s)
    }
}

/// Snapshot of a scope resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub name: String,
    pub phase: ScopePhase,
    /// Cleanup hooks that must be cleared before the backend removes the scope
    pub finalizers: Vec<String>,
}
