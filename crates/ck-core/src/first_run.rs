//! First-run progress model

use serde::{Deserialize, Serialize};

/// Progress through the bounded first-run onboarding flow.
///
/// `step` only ever grows. `done` is a `>=` comparison, so advancing one
/// step past `total` is harmless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstRunProgress {
    pub step: u32,
    pub total: u32,
}

impl FirstRunProgress {
    pub fn new(total: u32) -> Self {
        Self { step: 0, total }
    }

    /// Advance by exactly one step.
    pub fn advance(&mut self) {
        self.step = self.step.saturating_add(1);
    }

    pub fn done(&self) -> bool {
        self.step >= self.total
    }
}
