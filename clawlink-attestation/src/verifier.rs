//! Offline attestation verification for third parties.

use std::collections::HashMap;

use crate::attestation::OwnershipAttestation;
use crate::error::AttestationError;
use crate::jwk::Jwk;
use crate::keys::{VerifyingKey, decode_signature};

/// Verifies ownership attestations without contacting the issuing backend.
///
/// The verifier maintains a set of trusted issuers and their public keys,
/// usually loaded from each backend's published key set.
///
/// # Example
///
/// ```
/// use clawlink::{BotId, OwnerId};
/// use clawlink_attestation::{Issuer, Jwk, SigningKey, Verifier};
///
/// let issuer = Issuer::generate("https://linker.example");
/// let bot_key = SigningKey::generate().verifying_key().to_encoded();
/// let attestation = issuer
///     .issue(&OwnerId::parse("alien-1").unwrap(), &BotId::new(), &bot_key)
///     .unwrap();
///
/// // A third party only has the published JWK.
/// let jwk = Jwk::from_verifying_key(&issuer.verifying_key());
/// let verifier = Verifier::from_jwk("https://linker.example", &jwk).unwrap();
///
/// assert!(verifier.verify(&attestation).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    trusted_issuers: HashMap<String, VerifyingKey>,
}

impl Verifier {
    /// Creates a new verifier with no trusted issuers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a verifier trusting a single issuer's published JWK.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::UnsupportedJwk` or `InvalidKeyFormat` if
    /// the JWK is not a usable Ed25519 key.
    pub fn from_jwk(issued_by: impl Into<String>, jwk: &Jwk) -> Result<Self, AttestationError> {
        let mut verifier = Self::new();
        verifier.add_trusted_jwk(issued_by, jwk)?;
        Ok(verifier)
    }

    /// Adds a trusted issuer and its public key.
    pub fn add_trusted_issuer(&mut self, issued_by: impl Into<String>, key: VerifyingKey) {
        self.trusted_issuers.insert(issued_by.into(), key);
    }

    /// Adds a trusted issuer from a published JWK.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::UnsupportedJwk` or `InvalidKeyFormat` if
    /// the JWK is not a usable Ed25519 key.
    pub fn add_trusted_jwk(
        &mut self,
        issued_by: impl Into<String>,
        jwk: &Jwk,
    ) -> Result<(), AttestationError> {
        let key = jwk.to_verifying_key()?;
        self.add_trusted_issuer(issued_by, key);
        Ok(())
    }

    /// Returns true if the given issuer is trusted.
    #[must_use]
    pub fn has_trusted_issuer(&self, issued_by: &str) -> bool {
        self.trusted_issuers.contains_key(issued_by)
    }

    /// Returns the number of trusted issuers.
    #[must_use]
    pub fn trusted_issuer_count(&self) -> usize {
        self.trusted_issuers.len()
    }

    /// Verifies an attestation's signature against its issuer's key.
    ///
    /// Expiry is not checked here; combine with [`crate::check_expiration`].
    ///
    /// # Errors
    ///
    /// - `UntrustedIssuer` - `issuedBy` is not a trusted issuer
    /// - `InvalidSignatureEncoding` - signature field is malformed
    /// - `InvalidSignature` - signature does not match the payload
    pub fn verify(&self, attestation: &OwnershipAttestation) -> Result<(), AttestationError> {
        let key = self
            .trusted_issuers
            .get(&attestation.issued_by)
            .ok_or_else(|| AttestationError::UntrustedIssuer {
                issuer: attestation.issued_by.clone(),
            })?;

        verify_signature(attestation, key)
    }
}

/// Checks an attestation's signature against a specific key.
///
/// Rebuilds the canonical payload from the attestation's own fields, so any
/// change to a signed field invalidates the signature.
///
/// # Errors
///
/// Returns `InvalidSignatureEncoding` for a malformed signature field and
/// `InvalidSignature` when the signature does not verify.
pub fn verify_signature(
    attestation: &OwnershipAttestation,
    key: &VerifyingKey,
) -> Result<(), AttestationError> {
    let signature = decode_signature(&attestation.signature)?;
    let message = attestation.canonical_bytes()?;

    if key.verify(&message, &signature) {
        Ok(())
    } else {
        Err(AttestationError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use clawlink::{BotId, OwnerId};

    use super::*;
    use crate::issuer::Issuer;
    use crate::keys::SigningKey;

    fn issue(issuer: &Issuer) -> OwnershipAttestation {
        issuer
            .issue(
                &OwnerId::parse("alien-1").unwrap(),
                &BotId::new(),
                &SigningKey::generate().verifying_key().to_encoded(),
            )
            .unwrap()
    }

    #[test]
    fn verifier_starts_empty() {
        let verifier = Verifier::new();
        assert_eq!(verifier.trusted_issuer_count(), 0);
        assert!(!verifier.has_trusted_issuer("https://linker.example"));
    }

    #[test]
    fn verify_valid_attestation() {
        let issuer = Issuer::generate("https://linker.example");
        let mut verifier = Verifier::new();
        verifier.add_trusted_issuer("https://linker.example", issuer.verifying_key());

        assert_eq!(verifier.verify(&issue(&issuer)), Ok(()));
    }

    #[test]
    fn verify_rejects_untrusted_issuer() {
        let issuer = Issuer::generate("https://evil.example");
        let mut verifier = Verifier::new();
        verifier.add_trusted_issuer("https://linker.example", issuer.verifying_key());

        assert!(matches!(
            verifier.verify(&issue(&issuer)),
            Err(AttestationError::UntrustedIssuer { issuer }) if issuer == "https://evil.example"
        ));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let issuer = Issuer::generate("https://linker.example");
        let mut verifier = Verifier::new();
        verifier.add_trusted_issuer(
            "https://linker.example",
            SigningKey::generate().verifying_key(),
        );

        assert_eq!(
            verifier.verify(&issue(&issuer)),
            Err(AttestationError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_reissued_owner() {
        let issuer = Issuer::generate("https://linker.example");
        let mut verifier = Verifier::new();
        verifier.add_trusted_issuer("https://linker.example", issuer.verifying_key());
        let mut attestation = issue(&issuer);

        attestation.alien_id = "alien-2".to_string();

        assert_eq!(
            verifier.verify(&attestation),
            Err(AttestationError::InvalidSignature)
        );
    }
}
