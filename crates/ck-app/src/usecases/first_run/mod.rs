//! First-run onboarding use cases.

mod sequencer;

pub use sequencer::FirstRunSequencer;
