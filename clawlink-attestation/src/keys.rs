//! Key types for attestation signing and verification.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clawlink::EncodedPublicKey;
use ed25519_dalek::{
    Signature, Signer as _, SigningKey as DalekSigningKey, Verifier as _,
    VerifyingKey as DalekVerifyingKey,
};

use crate::error::AttestationError;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// A signing key for creating attestations and challenge responses.
///
/// Wraps an Ed25519 private key. Signing is deterministic: the same key and
/// message always produce the same signature bytes.
///
/// # Example
///
/// ```
/// use clawlink_attestation::SigningKey;
///
/// let signing_key = SigningKey::generate();
/// let verifying_key = signing_key.verifying_key();
///
/// let signature = signing_key.sign(b"nonce-123");
/// assert!(verifying_key.verify(b"nonce-123", &signature));
/// ```
#[derive(Clone)]
pub struct SigningKey {
    inner: DalekSigningKey,
}

impl SigningKey {
    /// Creates a new random signing key from the OS-seeded CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            inner: DalekSigningKey::generate(&mut rng),
        }
    }

    /// Creates a signing key from its 32-byte seed.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            inner: DalekSigningKey::from_bytes(bytes),
        }
    }

    /// Decodes a signing key from standard base64 of its 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidKeyFormat` if the input is not
    /// base64 or does not decode to exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, AttestationError> {
        let bytes = decode_key_bytes(encoded)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Returns the raw seed bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Returns the seed as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Returns the corresponding verifying (public) key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Signs a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.inner.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("public_key", &self.verifying_key())
            .finish_non_exhaustive()
    }
}

/// A verifying key for checking attestations and challenge responses.
///
/// This key can be safely shared and distributed.
///
/// # Example
///
/// ```
/// use clawlink_attestation::{SigningKey, VerifyingKey};
///
/// let signing_key = SigningKey::generate();
/// let verifying_key = signing_key.verifying_key();
///
/// let encoded = verifying_key.to_encoded();
/// assert!(encoded.as_str().starts_with("ed25519:"));
///
/// let recovered = VerifyingKey::from_encoded(&encoded).unwrap();
/// assert_eq!(recovered, verifying_key);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: DalekVerifyingKey,
}

impl VerifyingKey {
    /// Creates a verifying key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidKeyFormat` if the bytes are not a
    /// valid Ed25519 curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, AttestationError> {
        DalekVerifyingKey::from_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| AttestationError::InvalidKeyFormat {
                reason: e.to_string(),
            })
    }

    /// Decodes a verifying key from standard base64 of its 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidKeyFormat` on bad encoding, wrong
    /// length, or an invalid curve point.
    pub fn from_base64(encoded: &str) -> Result<Self, AttestationError> {
        Self::from_bytes(&decode_key_bytes(encoded)?)
    }

    /// Builds a verifying key from an algorithm-prefixed wire key.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidKeyFormat` if the bytes are not a
    /// valid curve point.
    pub fn from_encoded(encoded: &EncodedPublicKey) -> Result<Self, AttestationError> {
        Self::from_bytes(encoded.key_bytes())
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Returns the key as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Returns the `ed25519:<base64>` wire form.
    #[must_use]
    pub fn to_encoded(&self) -> EncodedPublicKey {
        EncodedPublicKey::from_ed25519_bytes(&self.to_bytes())
    }

    /// Checks a signature over `message`.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
        let signature = Signature::from_bytes(signature);
        self.inner.verify(message, &signature).is_ok()
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 4 bytes of public key for identification
        let bytes = self.to_bytes();
        write!(
            f,
            "VerifyingKey({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

/// Encodes a signature as standard base64.
#[must_use]
pub fn encode_signature(signature: &[u8; SIGNATURE_LENGTH]) -> String {
    STANDARD.encode(signature)
}

/// Decodes a standard base64 signature.
///
/// # Errors
///
/// Returns `AttestationError::InvalidSignatureEncoding` if the input is not
/// base64 or not exactly 64 bytes long.
pub fn decode_signature(encoded: &str) -> Result<[u8; SIGNATURE_LENGTH], AttestationError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| AttestationError::InvalidSignatureEncoding {
            reason: e.to_string(),
        })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| AttestationError::InvalidSignatureEncoding {
            reason: format!("expected 64 bytes, got {}", bytes.len()),
        })
}

fn decode_key_bytes(encoded: &str) -> Result<[u8; 32], AttestationError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AttestationError::InvalidKeyFormat {
            reason: format!("not base64: {e}"),
        })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| AttestationError::InvalidKeyFormat {
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        })
}
