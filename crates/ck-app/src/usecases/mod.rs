//! Use cases for the store lock lifecycle.

pub mod bootstrap;
pub mod first_run;
pub mod lock;
pub mod settings;

pub use bootstrap::{BootstrapError, Bootstrapper};
pub use first_run::FirstRunSequencer;
pub use lock::{LockController, LockError};
pub use settings::SettingsStore;
