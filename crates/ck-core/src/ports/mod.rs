//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations, keeping the core independent of
//! how the store, the settings file, or the UI shell are realized.

pub mod localization;
pub mod secure_store;
pub mod settings;
pub mod ui_shell;

pub use localization::LocalizationPort;
pub use secure_store::{SecureStorePort, StoreError};
pub use settings::SettingsPort;
pub use ui_shell::UiShellPort;
