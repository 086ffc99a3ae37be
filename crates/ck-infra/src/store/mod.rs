//! Secure store adapters.

mod encrypted_file;

pub use encrypted_file::{EncryptedFileStore, KdfParams};
