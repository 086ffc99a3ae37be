//! CertKeeper Application Orchestration Layer
//!
//! This crate contains the use cases driving the store lock lifecycle:
//! startup sequencing, unlock and password changes, settings persistence
//! and the first-run flow.

pub mod usecases;

pub use usecases::{
    Bootstrapper, FirstRunSequencer, LockController, SettingsStore,
};
