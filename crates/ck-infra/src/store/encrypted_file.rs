//! Encrypted single-file store.
//!
//! The store is one JSON document: a plaintext header (hex salt, KDF
//! parameters, first-run flag) plus sealed values. An empty salt marks
//! an unprotected store, which opens with a pass-through cipher. For a
//! protected store the master password feeds Argon2id, and the derived
//! key must open the key-check blob before any data is touched; a failed
//! open is reported as an invalid password.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use argon2::Argon2;
use async_trait::async_trait;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use ck_core::ports::{SecureStorePort, StoreError};
use ck_core::MasterPassword;

const STORE_VERSION: u32 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;
const KEY_CHECK: &[u8] = b"certkeeper.key-check.v1";

/// Argon2id cost parameters recorded in the store header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub mem_kib: u32,
    pub iters: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_kib: 19_456,
            iters: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SealedValue {
    nonce: String,
    ciphertext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    /// Hex-encoded KDF salt. Empty means the store is unprotected.
    salt: String,
    kdf: KdfParams,
    first_run: bool,
    key_check: Option<SealedValue>,
    entries: BTreeMap<String, SealedValue>,
}

impl StoreFile {
    fn fresh(kdf: KdfParams) -> Self {
        Self {
            version: STORE_VERSION,
            salt: String::new(),
            kdf,
            first_run: true,
            key_check: None,
            entries: BTreeMap::new(),
        }
    }
}

enum SealFailure {
    Encoding,
    Aead,
}

/// Pass-through for unprotected stores, AEAD otherwise.
enum StoreCipher {
    Plain,
    Sealed(XChaCha20Poly1305),
}

impl StoreCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<SealedValue, SealFailure> {
        match self {
            StoreCipher::Plain => Ok(SealedValue {
                nonce: String::new(),
                ciphertext: hex::encode(plaintext),
            }),
            StoreCipher::Sealed(cipher) => {
                let mut nonce = [0u8; NONCE_LEN];
                rand::rng().fill_bytes(&mut nonce);
                let ciphertext = cipher
                    .encrypt(XNonce::from_slice(&nonce), plaintext)
                    .map_err(|_| SealFailure::Aead)?;
                Ok(SealedValue {
                    nonce: hex::encode(nonce),
                    ciphertext: hex::encode(ciphertext),
                })
            }
        }
    }

    fn open(&self, value: &SealedValue) -> Result<Vec<u8>, SealFailure> {
        match self {
            StoreCipher::Plain => hex::decode(&value.ciphertext).map_err(|_| SealFailure::Encoding),
            StoreCipher::Sealed(cipher) => {
                let nonce = hex::decode(&value.nonce).map_err(|_| SealFailure::Encoding)?;
                if nonce.len() != NONCE_LEN {
                    return Err(SealFailure::Encoding);
                }
                let ciphertext =
                    hex::decode(&value.ciphertext).map_err(|_| SealFailure::Encoding)?;
                cipher
                    .decrypt(XNonce::from_slice(&nonce), ciphertext.as_ref())
                    .map_err(|_| SealFailure::Aead)
            }
        }
    }
}

struct Inner {
    file: StoreFile,
    /// `None` while a protected store is still locked.
    cipher: Option<StoreCipher>,
}

/// [`SecureStorePort`] adapter over a single encrypted JSON file.
pub struct EncryptedFileStore {
    path: PathBuf,
    kdf: KdfParams,
    inner: Mutex<Inner>,
}

impl EncryptedFileStore {
    /// Open or create the store file at `path`.
    ///
    /// A freshly created store is unprotected, immediately open, and has
    /// its first-run flag set.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_params(path, KdfParams::default()).await
    }

    /// Open with explicit KDF cost parameters, applied when the store is
    /// next protected.
    pub async fn open_with_params(
        path: impl Into<PathBuf>,
        kdf: KdfParams,
    ) -> Result<Self, StoreError> {
        let path = path.into();

        let file: StoreFile = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::Io(format!("store file is corrupted: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let file = StoreFile::fresh(kdf);
                persist(&path, &file).await?;
                info!(path = %path.display(), "created fresh store");
                file
            }
            Err(e) => return Err(e.into()),
        };

        let cipher = if file.salt.is_empty() {
            Some(StoreCipher::Plain)
        } else {
            None
        };

        Ok(Self {
            path,
            kdf,
            inner: Mutex::new(Inner { file, cipher }),
        })
    }

    /// Read a string value. Requires the store to be unlocked.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().await;
        let cipher = inner.cipher.as_ref().ok_or(StoreError::Locked)?;

        match inner.file.entries.get(key) {
            None => Ok(None),
            Some(sealed) => {
                let plaintext = cipher
                    .open(sealed)
                    .map_err(|_| StoreError::Io(format!("entry {key:?} is corrupted")))?;
                String::from_utf8(plaintext)
                    .map(Some)
                    .map_err(|_| StoreError::Io(format!("entry {key:?} is not valid UTF-8")))
            }
        }
    }

    /// Write a string value. Requires the store to be unlocked.
    pub async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let cipher = inner.cipher.as_ref().ok_or(StoreError::Locked)?;

        let sealed = cipher
            .seal(value.as_bytes())
            .map_err(|_| StoreError::Io("sealing entry failed".to_string()))?;
        inner.file.entries.insert(key.to_string(), sealed);
        persist(&self.path, &inner.file).await
    }
}

#[async_trait]
impl SecureStorePort for EncryptedFileStore {
    async fn is_locked(&self) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.cipher.is_none())
    }

    async fn is_protected(&self) -> Result<bool, StoreError> {
        Ok(!self.inner.lock().await.file.salt.is_empty())
    }

    async fn is_first_run(&self) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.file.first_run)
    }

    async fn unlock(&self, password: &MasterPassword) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        if inner.cipher.is_some() {
            debug!("store already open");
            return Ok(());
        }

        let salt = hex::decode(&inner.file.salt)
            .map_err(|_| StoreError::Io("salt is corrupted".to_string()))?;
        let key = derive_key(password, &salt, &inner.file.kdf)?;
        let cipher = XChaCha20Poly1305::new_from_slice(&key)
            .map_err(|_| StoreError::Io("derived key has invalid length".to_string()))?;

        let key_check = inner
            .file
            .key_check
            .as_ref()
            .ok_or_else(|| StoreError::Io("protected store has no key check".to_string()))?;
        let candidate = StoreCipher::Sealed(cipher);
        match candidate.open(key_check) {
            Ok(plaintext) if plaintext == KEY_CHECK => {}
            Ok(_) => return Err(StoreError::Io("key check is corrupted".to_string())),
            Err(SealFailure::Aead) => return Err(StoreError::InvalidPassword),
            Err(SealFailure::Encoding) => {
                return Err(StoreError::Io("key check is corrupted".to_string()))
            }
        }

        inner.cipher = Some(candidate);
        info!("store unlocked");
        Ok(())
    }

    async fn change_password(&self, new_password: &MasterPassword) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let cipher = inner.cipher.as_ref().ok_or(StoreError::Locked)?;

        // Decrypt everything under the old key before touching the header.
        let mut plaintexts = BTreeMap::new();
        for (key, sealed) in &inner.file.entries {
            let plaintext = cipher
                .open(sealed)
                .map_err(|_| StoreError::Io(format!("entry {key:?} is corrupted")))?;
            plaintexts.insert(key.clone(), plaintext);
        }

        let (next_cipher, salt_hex, key_check) = if new_password.is_empty() {
            (StoreCipher::Plain, String::new(), None)
        } else {
            let mut salt = [0u8; SALT_LEN];
            rand::rng().fill_bytes(&mut salt);
            let key = derive_key(new_password, &salt, &self.kdf)?;
            let cipher = XChaCha20Poly1305::new_from_slice(&key)
                .map_err(|_| StoreError::Io("derived key has invalid length".to_string()))?;
            let sealed_check = StoreCipher::Sealed(cipher);
            let key_check = sealed_check
                .seal(KEY_CHECK)
                .map_err(|_| StoreError::Io("sealing key check failed".to_string()))?;
            (sealed_check, hex::encode(salt), Some(key_check))
        };

        let mut entries = BTreeMap::new();
        for (key, plaintext) in plaintexts {
            let sealed = next_cipher
                .seal(&plaintext)
                .map_err(|_| StoreError::Io("re-sealing entry failed".to_string()))?;
            entries.insert(key, sealed);
        }

        inner.file.salt = salt_hex;
        inner.file.kdf = self.kdf;
        inner.file.key_check = key_check;
        inner.file.entries = entries;
        persist(&self.path, &inner.file).await?;
        inner.cipher = Some(next_cipher);

        info!(
            protected = !inner.file.salt.is_empty(),
            "store re-encrypted"
        );
        Ok(())
    }

    async fn mark_first_run_complete(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.file.first_run = false;
        persist(&self.path, &inner.file).await
    }
}

fn derive_key(
    password: &MasterPassword,
    salt: &[u8],
    kdf: &KdfParams,
) -> Result<[u8; KEY_LEN], StoreError> {
    let params = argon2::Params::new(kdf.mem_kib, kdf.iters, kdf.parallelism, Some(KEY_LEN))
        .map_err(|e| StoreError::Io(format!("invalid KDF parameters: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.expose().as_bytes(), salt, &mut key)
        .map_err(|e| StoreError::Io(format!("key derivation failed: {e}")))?;
    Ok(key)
}

/// Write the store document to a temp file and rename it over the
/// target, so the file is either the previous or the new contents.
async fn persist(path: &Path, file: &StoreFile) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }

    let content = serde_json::to_string_pretty(file)
        .map_err(|e| StoreError::Io(format!("serialize store failed: {e}")))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_kdf() -> KdfParams {
        KdfParams {
            mem_kib: 32,
            iters: 1,
            parallelism: 1,
        }
    }

    async fn open(dir: &TempDir) -> EncryptedFileStore {
        EncryptedFileStore::open_with_params(dir.path().join("store.json"), test_kdf())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fresh_store_is_open_unprotected_and_first_run() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;

        assert!(!store.is_locked().await.unwrap());
        assert!(!store.is_protected().await.unwrap());
        assert!(store.is_first_run().await.unwrap());
    }

    #[tokio::test]
    async fn values_round_trip_in_unprotected_store() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;

        store.put("cert", "pem-data").await.unwrap();
        assert_eq!(store.get("cert").await.unwrap().as_deref(), Some("pem-data"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn protecting_survives_reopen_and_gates_access() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            store.put("cert", "pem-data").await.unwrap();
            store
                .change_password(&MasterPassword::new("s3cret"))
                .await
                .unwrap();
        }

        let store = open(&dir).await;
        assert!(store.is_locked().await.unwrap());
        assert!(store.is_protected().await.unwrap());
        assert!(matches!(store.get("cert").await, Err(StoreError::Locked)));

        let err = store
            .unlock(&MasterPassword::new("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPassword));
        assert!(store.is_locked().await.unwrap());

        store.unlock(&MasterPassword::new("s3cret")).await.unwrap();
        assert!(!store.is_locked().await.unwrap());
        assert_eq!(store.get("cert").await.unwrap().as_deref(), Some("pem-data"));
    }

    #[tokio::test]
    async fn empty_password_unlock_is_attempted_and_rejected() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            store
                .change_password(&MasterPassword::new("s3cret"))
                .await
                .unwrap();
        }

        let store = open(&dir).await;
        let err = store.unlock(&MasterPassword::empty()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPassword));
    }

    #[tokio::test]
    async fn removing_protection_reopens_without_password() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            store.put("cert", "pem-data").await.unwrap();
            store
                .change_password(&MasterPassword::new("s3cret"))
                .await
                .unwrap();
            store
                .change_password(&MasterPassword::empty())
                .await
                .unwrap();
        }

        let store = open(&dir).await;
        assert!(!store.is_locked().await.unwrap());
        assert!(!store.is_protected().await.unwrap());
        assert_eq!(store.get("cert").await.unwrap().as_deref(), Some("pem-data"));
    }

    #[tokio::test]
    async fn change_password_requires_unlocked_store() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            store
                .change_password(&MasterPassword::new("s3cret"))
                .await
                .unwrap();
        }

        let store = open(&dir).await;
        let err = store
            .change_password(&MasterPassword::new("other"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Locked));
    }

    #[tokio::test]
    async fn first_run_flag_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            assert!(store.is_first_run().await.unwrap());
            store.mark_first_run_complete().await.unwrap();
        }

        let store = open(&dir).await;
        assert!(!store.is_first_run().await.unwrap());
    }

    #[tokio::test]
    async fn rotating_password_keeps_entries_readable() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir).await;
            store.put("cert", "pem-data").await.unwrap();
            store
                .change_password(&MasterPassword::new("first"))
                .await
                .unwrap();
            store
                .change_password(&MasterPassword::new("second"))
                .await
                .unwrap();
        }

        let store = open(&dir).await;
        let err = store
            .unlock(&MasterPassword::new("first"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPassword));

        store.unlock(&MasterPassword::new("second")).await.unwrap();
        assert_eq!(store.get("cert").await.unwrap().as_deref(), Some("pem-data"));
    }
}
