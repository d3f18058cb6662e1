//! The bot's long-lived signing identity.

use clawlink::EncodedPublicKey;
use clawlink_attestation::{SIGNATURE_LENGTH, SigningKey, VerifyingKey, encode_signature};
use tracing::info;

use crate::error::IdentityError;
use crate::storage::{KeyStorage, StoredKeypair};

/// An Ed25519 keypair whose private half never leaves the bot.
///
/// # Examples
///
/// ```
/// use clawlink_identity::{Keypair, MemoryKeyStorage};
///
/// let storage = MemoryKeyStorage::new();
/// let first = Keypair::load_or_create(&storage).unwrap();
/// let again = Keypair::load_or_create(&storage).unwrap();
///
/// assert_eq!(first.public_key(), again.public_key());
/// assert!(first.public_key().as_str().starts_with("ed25519:"));
/// ```
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    public_key: EncodedPublicKey,
}

impl Keypair {
    /// Loads the persisted keypair, or generates and persists a new one when
    /// nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Fails if stored material is incomplete, malformed, or its public
    /// half does not belong to its private half, or if a new keypair cannot
    /// be written. Stored material is never replaced.
    pub fn load_or_create(storage: &dyn KeyStorage) -> Result<Self, IdentityError> {
        if let Some(stored) = storage.load()? {
            return Self::from_stored(&stored);
        }

        let keypair = Self::from_signing_key(SigningKey::generate());
        storage.save(&keypair.to_stored())?;
        info!(public_key = %keypair.public_key, "generated new identity keypair");
        Ok(keypair)
    }

    /// Wraps an existing signing key.
    #[must_use]
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = signing_key.verifying_key().to_encoded();
        Self {
            signing_key,
            public_key,
        }
    }

    fn from_stored(stored: &StoredKeypair) -> Result<Self, IdentityError> {
        let keypair = Self::from_signing_key(SigningKey::from_bytes(stored.private_key()));
        if keypair.public_key.key_bytes() != stored.public_key() {
            return Err(IdentityError::CorruptKey {
                path: crate::storage::PUBLIC_KEY_FILE.into(),
                reason: "public key does not belong to the private key".to_string(),
            });
        }
        Ok(keypair)
    }

    fn to_stored(&self) -> StoredKeypair {
        StoredKeypair::new(self.signing_key.to_bytes(), *self.public_key.key_bytes())
    }

    /// Returns the public key in wire form (`ed25519:<base64>`).
    #[must_use]
    pub const fn public_key(&self) -> &EncodedPublicKey {
        &self.public_key
    }

    /// Returns the public key for signature checks.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs `message`. Ed25519 is deterministic: the same message always
    /// yields the same signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message)
    }

    /// Signs `message` and returns the standard base64 signature.
    #[must_use]
    pub fn sign_base64(&self, message: &[u8]) -> String {
        encode_signature(&self.sign(message))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
