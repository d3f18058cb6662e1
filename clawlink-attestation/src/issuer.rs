//! Attestation issuer for the linker backend.

use chrono::{DateTime, Utc};
use clawlink::{BotId, EncodedPublicKey, OwnerId};

use crate::attestation::{OwnershipAttestation, UnsignedAttestation};
use crate::error::AttestationError;
use crate::keys::{SigningKey, VerifyingKey};
use crate::verifier::verify_signature;

/// Creates ownership attestations.
///
/// The issuer holds the backend signing key and its own identity (usually
/// the backend base URL), both injected at construction.
///
/// # Example
///
/// ```
/// use clawlink::{BotId, EncodedPublicKey, OwnerId};
/// use clawlink_attestation::{Issuer, SigningKey};
///
/// let issuer = Issuer::new("https://linker.example", SigningKey::generate());
///
/// let bot_key = SigningKey::generate().verifying_key().to_encoded();
/// let attestation = issuer
///     .issue(&OwnerId::parse("alien-1").unwrap(), &BotId::new(), &bot_key)
///     .unwrap();
///
/// assert_eq!(attestation.alien_id, "alien-1");
/// assert!(issuer.verify(&attestation));
/// ```
#[derive(Debug, Clone)]
pub struct Issuer {
    issued_by: String,
    signing_key: SigningKey,
}

impl Issuer {
    /// Creates a new issuer.
    ///
    /// # Arguments
    ///
    /// * `issued_by` - The issuer identity written into every attestation
    /// * `signing_key` - The backend Ed25519 signing key
    #[must_use]
    pub fn new(issued_by: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            issued_by: issued_by.into(),
            signing_key,
        }
    }

    /// Generates a new issuer with a random signing key.
    #[must_use]
    pub fn generate(issued_by: impl Into<String>) -> Self {
        Self::new(issued_by, SigningKey::generate())
    }

    /// Returns the issuer identity.
    #[must_use]
    pub fn issued_by(&self) -> &str {
        &self.issued_by
    }

    /// Returns the verifying (public) key for this issuer.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Issues an attestation binding `owner` to `bot`, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError` if the payload cannot be built or signed.
    pub fn issue(
        &self,
        owner: &OwnerId,
        bot: &BotId,
        public_key: &EncodedPublicKey,
    ) -> Result<OwnershipAttestation, AttestationError> {
        self.issue_at(owner, bot, public_key, Utc::now())
    }

    /// Issues an attestation with an explicit issuance time.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError` if the payload cannot be built or signed.
    pub fn issue_at(
        &self,
        owner: &OwnerId,
        bot: &BotId,
        public_key: &EncodedPublicKey,
        issued_at: DateTime<Utc>,
    ) -> Result<OwnershipAttestation, AttestationError> {
        UnsignedAttestation::new(owner, bot, public_key, &self.issued_by, issued_at)?
            .sign(&self.signing_key)
    }

    /// Checks an attestation's signature against this issuer's public key.
    ///
    /// This is a pure cryptographic check; expiry is left to the caller
    /// (see [`crate::check_expiration`]).
    #[must_use]
    pub fn verify(&self, attestation: &OwnershipAttestation) -> bool {
        verify_signature(attestation, &self.verifying_key()).is_ok()
    }
}
