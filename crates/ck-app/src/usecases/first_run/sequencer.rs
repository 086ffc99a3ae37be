//! First-run sequencer.

use std::sync::Mutex;

use ck_core::FirstRunProgress;

/// Steps the bounded onboarding flow and reports completion.
///
/// Pure progress state, no suspension points. When `done` flips to true
/// the owning flow is expected to call the lock controller's
/// `complete_first_run` exactly once so the acknowledgement is durably
/// recorded and the flow is never shown again.
pub struct FirstRunSequencer {
    progress: Mutex<FirstRunProgress>,
}

impl FirstRunSequencer {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(FirstRunProgress::default()),
        }
    }

    /// Set the number of steps the onboarding flow presents.
    pub fn configure(&self, total: u32) {
        let mut progress = self.progress.lock().unwrap();
        *progress = FirstRunProgress::new(total);
    }

    /// Advance one step, returning the updated progress.
    pub fn advance(&self) -> FirstRunProgress {
        let mut progress = self.progress.lock().unwrap();
        progress.advance();
        *progress
    }

    pub fn done(&self) -> bool {
        self.progress.lock().unwrap().done()
    }

    pub fn progress(&self) -> FirstRunProgress {
        *self.progress.lock().unwrap()
    }
}

impl Default for FirstRunSequencer {
    fn default() -> Self {
        Self::new()
    }
}
