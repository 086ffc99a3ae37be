use async_trait::async_trait;

use crate::security::MasterPassword;

/// Errors surfaced by the secure store.
///
/// `InvalidPassword` is terminal for the attempt and never retried by the
/// core. `Locked` is a precondition failure at the store boundary.
/// Everything else is an I/O failure and fatal for the call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid master password")]
    InvalidPassword,

    #[error("store is locked")]
    Locked,

    #[error("store I/O failed: {0}")]
    Io(String),
}

impl StoreError {
    /// True when the failure means the supplied credential was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, StoreError::InvalidPassword | StoreError::Locked)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// The password-protected store the lock lifecycle is built around.
///
/// Queries are idempotent and return current truth on every call.
/// `unlock` and `change_password` have side effects and must not be
/// assumed idempotent; the caller decides whether a failure is worth
/// retrying.
#[async_trait]
pub trait SecureStorePort: Send + Sync {
    async fn is_locked(&self) -> Result<bool, StoreError>;

    /// True iff a master password is currently set.
    async fn is_protected(&self) -> Result<bool, StoreError>;

    async fn is_first_run(&self) -> Result<bool, StoreError>;

    /// Attempt to open the store with the given password.
    ///
    /// The empty password is valid input and is attempted as given.
    async fn unlock(&self, password: &MasterPassword) -> Result<(), StoreError>;

    /// Re-encrypt the store under a new password.
    ///
    /// Valid only while the store is unlocked. Setting the empty password
    /// removes protection.
    async fn change_password(&self, new_password: &MasterPassword) -> Result<(), StoreError>;

    async fn mark_first_run_complete(&self) -> Result<(), StoreError>;
}
