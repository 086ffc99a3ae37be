use std::fmt;
use zeroize::Zeroize;

/// The master password guarding the encrypted store.
///
/// - not `Clone`
/// - not `Serialize` / `Deserialize`
/// - `Debug` / `Display` never reveal the content
/// - memory is zeroed on drop
///
/// The empty password is a valid value: an unprotected store is opened
/// with it, and changing the password to the empty one removes
/// protection.
pub struct MasterPassword {
    inner: String,
}

impl MasterPassword {
    /// Wrap a password supplied by the caller.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// The empty password, used to open unprotected stores and to remove
    /// protection.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Borrow the secret as `&str`.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for MasterPassword {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}
