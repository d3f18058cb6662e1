//! Local cache of the bot's ownership attestation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use clawlink_attestation::OwnershipAttestation;

use crate::error::IdentityError;

/// File name of the cached attestation.
pub const ATTESTATION_FILE: &str = "attestation.json";

/// Holds the most recent attestation received for this bot.
///
/// The value is only ever replaced whole.
pub trait AttestationCache: Send + Sync {
    /// Returns the cached attestation, or `None` before the bot is claimed.
    ///
    /// # Errors
    ///
    /// Returns `CorruptAttestation` or `Io` if the cache exists but cannot
    /// be read.
    fn load(&self) -> Result<Option<OwnershipAttestation>, IdentityError>;

    /// Replaces the cached attestation unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serialization` if the value cannot be written.
    fn store(&self, attestation: &OwnershipAttestation) -> Result<(), IdentityError>;
}

/// Runs `op` against `cache` on the blocking thread pool.
///
/// Cache implementations are synchronous and may touch the filesystem;
/// async callers go through here instead of calling them directly.
///
/// # Errors
///
/// Returns the error from `op`, or `Storage` if the blocking task panicked
/// or was cancelled.
pub async fn with_cache<T, F>(cache: &Arc<dyn AttestationCache>, op: F) -> Result<T, IdentityError>
where
    F: FnOnce(&dyn AttestationCache) -> Result<T, IdentityError> + Send + 'static,
    T: Send + 'static,
{
    let cache = Arc::clone(cache);
    tokio::task::spawn_blocking(move || op(cache.as_ref()))
        .await
        .map_err(|e| IdentityError::storage(format!("attestation cache task failed: {e}")))?
}

/// Pretty-printed `attestation.json` next to the keypair.
///
/// Writes go to a temporary sibling first and are renamed into place, so
/// readers see either the old or the new attestation.
#[derive(Debug, Clone)]
pub struct FileAttestationCache {
    path: PathBuf,
}

impl FileAttestationCache {
    /// Creates a cache at `<dir>/attestation.json`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(ATTESTATION_FILE),
        }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttestationCache for FileAttestationCache {
    fn load(&self) -> Result<Option<OwnershipAttestation>, IdentityError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IdentityError::io(&self.path, &e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| IdentityError::CorruptAttestation {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn store(&self, attestation: &OwnershipAttestation) -> Result<(), IdentityError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| IdentityError::io(dir, &e))?;
        }

        let json = serde_json::to_string_pretty(attestation).map_err(|e| {
            IdentityError::Serialization {
                reason: e.to_string(),
            }
        })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| IdentityError::io(&staging, &e))?;
        fs::rename(&staging, &self.path).map_err(|e| IdentityError::io(&self.path, &e))
    }
}

/// In-memory attestation cache.
#[derive(Debug, Default)]
pub struct MemoryAttestationCache {
    attestation: RwLock<Option<OwnershipAttestation>>,
}

impl MemoryAttestationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttestationCache for MemoryAttestationCache {
    fn load(&self) -> Result<Option<OwnershipAttestation>, IdentityError> {
        self.attestation
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| IdentityError::storage("attestation lock poisoned"))
    }

    fn store(&self, attestation: &OwnershipAttestation) -> Result<(), IdentityError> {
        let mut guard = self
            .attestation
            .write()
            .map_err(|_| IdentityError::storage("attestation lock poisoned"))?;
        *guard = Some(attestation.clone());
        Ok(())
    }
}
