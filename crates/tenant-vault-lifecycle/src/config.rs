//! Lifecycle timing configuration.

use std::time::Duration;

/// Poll cadence and deadlines for scope convergence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Delay between two reads of the scope
    pub poll_interval: Duration,
    /// How long a new scope may take to become active
    pub create_timeout: Duration,
    /// How long a deleted scope may take to disappear on its own
    pub delete_timeout: Duration,
    /// Second window after finalizers have been cleared
    pub finalize_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            create_timeout: Duration::from_secs(10),
            delete_timeout: Duration::from_secs(30),
            finalize_timeout: Duration::from_secs(60),
        }
    }
}
