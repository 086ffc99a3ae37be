//! Lock lifecycle use cases.

mod controller;

pub use controller::{LockController, LockError};
