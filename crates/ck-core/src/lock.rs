//! Lock state domain model
//!
//! The lock state describes whether the encrypted store is currently
//! accessible, whether a master password gates access, and whether the
//! one-time first-run flow is still pending.

use serde::{Deserialize, Serialize};

/// Snapshot of the store lock lifecycle.
///
/// Owned and mutated exclusively by the lock controller in response to
/// store responses. Consumers read it through the controller's accessor
/// or watch subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    /// Whether protected data is currently inaccessible
    pub locked: bool,
    /// Whether a master password has been set (store is encrypted)
    pub protected: bool,
    /// Whether the one-time onboarding flow has not been acknowledged yet
    pub first_run: bool,
}

impl Default for LockState {
    /// Assume locked until the store has been queried.
    fn default() -> Self {
        Self {
            locked: true,
            protected: false,
            first_run: false,
        }
    }
}
