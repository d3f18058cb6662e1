//! Persistence for the bot keypair.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use clawlink::ED25519_KEY_LENGTH;

use crate::error::IdentityError;

/// File name of the private key seed.
pub const PRIVATE_KEY_FILE: &str = "identity.key";

/// File name of the public key.
pub const PUBLIC_KEY_FILE: &str = "identity.pub";

/// Raw key material as persisted: the 32-byte Ed25519 seed and the 32-byte
/// public key.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredKeypair {
    private_key: [u8; ED25519_KEY_LENGTH],
    public_key: [u8; ED25519_KEY_LENGTH],
}

impl StoredKeypair {
    /// Wraps raw key bytes.
    #[must_use]
    pub const fn new(
        private_key: [u8; ED25519_KEY_LENGTH],
        public_key: [u8; ED25519_KEY_LENGTH],
    ) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Returns the private seed.
    #[must_use]
    pub const fn private_key(&self) -> &[u8; ED25519_KEY_LENGTH] {
        &self.private_key
    }

    /// Returns the public key.
    #[must_use]
    pub const fn public_key(&self) -> &[u8; ED25519_KEY_LENGTH] {
        &self.public_key
    }
}

impl std::fmt::Debug for StoredKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredKeypair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Where the bot keeps its keypair.
///
/// `load` returns `Ok(None)` only when nothing has been persisted yet.
/// Partial or malformed material is an error so that a keypair bound to
/// existing attestations is never silently replaced.
pub trait KeyStorage: Send + Sync {
    /// Loads the persisted keypair, if any.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteKeypair`, `CorruptKey` or `Io` when material
    /// exists but cannot be used.
    fn load(&self) -> Result<Option<StoredKeypair>, IdentityError>;

    /// Persists a keypair, private half readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the material cannot be written.
    fn save(&self, keypair: &StoredKeypair) -> Result<(), IdentityError>;
}

/// Keypair files under a bot home directory.
///
/// | File | Contents | Mode |
/// |------|----------|------|
/// | `identity.key` | raw 32-byte seed | `0600` |
/// | `identity.pub` | raw 32-byte public key | `0644` |
#[derive(Debug, Clone)]
pub struct FileKeyStorage {
    dir: PathBuf,
}

impl FileKeyStorage {
    /// Creates storage rooted at `dir`. Nothing is touched until use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the private key path.
    #[must_use]
    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    /// Returns the public key path.
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }
}

impl KeyStorage for FileKeyStorage {
    fn load(&self) -> Result<Option<StoredKeypair>, IdentityError> {
        let private_path = self.private_key_path();
        let public_path = self.public_key_path();

        match (read_optional(&private_path)?, read_optional(&public_path)?) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(IdentityError::IncompleteKeypair {
                missing: public_path,
            }),
            (None, Some(_)) => Err(IdentityError::IncompleteKeypair {
                missing: private_path,
            }),
            (Some(private), Some(public)) => Ok(Some(StoredKeypair::new(
                key_bytes(&private_path, &private)?,
                key_bytes(&public_path, &public)?,
            ))),
        }
    }

    fn save(&self, keypair: &StoredKeypair) -> Result<(), IdentityError> {
        fs::create_dir_all(&self.dir).map_err(|e| IdentityError::io(&self.dir, &e))?;
        write_with_mode(&self.private_key_path(), keypair.private_key(), 0o600)?;
        write_with_mode(&self.public_key_path(), keypair.public_key(), 0o644)
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, IdentityError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IdentityError::io(path, &e)),
    }
}

fn key_bytes(path: &Path, bytes: &[u8]) -> Result<[u8; ED25519_KEY_LENGTH], IdentityError> {
    bytes.try_into().map_err(|_| IdentityError::CorruptKey {
        path: path.to_path_buf(),
        reason: format!("expected {ED25519_KEY_LENGTH} bytes, found {}", bytes.len()),
    })
}

#[cfg(unix)]
fn write_with_mode(path: &Path, bytes: &[u8], mode: u32) -> Result<(), IdentityError> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .map_err(|e| IdentityError::io(path, &e))?;
    // The mode above only applies to newly created files.
    file.set_permissions(fs::Permissions::from_mode(mode))
        .map_err(|e| IdentityError::io(path, &e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| IdentityError::io(path, &e))
}

#[cfg(not(unix))]
fn write_with_mode(path: &Path, bytes: &[u8], _mode: u32) -> Result<(), IdentityError> {
    let mut file = fs::File::create(path).map_err(|e| IdentityError::io(path, &e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| IdentityError::io(path, &e))
}

/// Keypair storage held in memory, for tests and ephemeral bots.
#[derive(Debug, Default)]
pub struct MemoryKeyStorage {
    keypair: RwLock<Option<StoredKeypair>>,
}

impl MemoryKeyStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that already holds `keypair`.
    #[must_use]
    pub fn with_keypair(keypair: StoredKeypair) -> Self {
        Self {
            keypair: RwLock::new(Some(keypair)),
        }
    }
}

impl KeyStorage for MemoryKeyStorage {
    fn load(&self) -> Result<Option<StoredKeypair>, IdentityError> {
        self.keypair
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| IdentityError::storage("keypair lock poisoned"))
    }

    fn save(&self, keypair: &StoredKeypair) -> Result<(), IdentityError> {
        let mut guard = self
            .keypair
            .write()
            .map_err(|_| IdentityError::storage("keypair lock poisoned"))?;
        *guard = Some(keypair.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredKeypair {
        StoredKeypair::new([1u8; 32], [2u8; 32])
    }

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileKeyStorage::new(dir.path().join("home"));

        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn saved_keypair_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileKeyStorage::new(dir.path().join("home"));

        storage.save(&sample()).unwrap();

        assert_eq!(storage.load().unwrap(), Some(sample()));
        assert_eq!(fs::read(storage.private_key_path()).unwrap(), vec![1u8; 32]);
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileKeyStorage::new(dir.path());
        storage.save(&sample()).unwrap();

        let private = fs::metadata(storage.private_key_path()).unwrap();
        let public = fs::metadata(storage.public_key_path()).unwrap();
        assert_eq!(private.permissions().mode() & 0o777, 0o600);
        assert_eq!(public.permissions().mode() & 0o777, 0o644);
    }

    #[test]
    fn missing_public_half_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileKeyStorage::new(dir.path());
        storage.save(&sample()).unwrap();
        fs::remove_file(storage.public_key_path()).unwrap();

        assert_eq!(
            storage.load(),
            Err(IdentityError::IncompleteKeypair {
                missing: storage.public_key_path()
            })
        );
    }

    #[test]
    fn truncated_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileKeyStorage::new(dir.path());
        storage.save(&sample()).unwrap();
        fs::write(storage.private_key_path(), [1u8; 12]).unwrap();

        assert!(matches!(
            storage.load(),
            Err(IdentityError::CorruptKey { reason, .. }) if reason.contains("found 12")
        ));
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryKeyStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        storage.save(&sample()).unwrap();

        assert_eq!(storage.load().unwrap(), Some(sample()));
    }

    #[test]
    fn debug_redacts_private_key() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("REDACTED"));
    }
}
