//! Backend signing key configuration.

use crate::error::AttestationError;
use crate::issuer::Issuer;
use crate::keys::{SigningKey, VerifyingKey};

/// The backend signing key as loaded at process start.
///
/// Built once from configuration and injected into the components that need
/// it. "Not configured" is a normal state the process can run in (claims and
/// key publication then fail with [`AttestationError::SigningKeyNotConfigured`]);
/// malformed key material is rejected when the value is built.
///
/// # Example
///
/// ```
/// use clawlink_attestation::{SigningKey, SigningKeyConfig};
///
/// let key = SigningKey::generate();
/// let config = SigningKeyConfig::from_base64(Some(&key.to_base64()), None).unwrap();
/// assert!(config.can_sign());
///
/// let empty = SigningKeyConfig::from_base64(None, Some("")).unwrap();
/// assert!(!empty.is_configured());
/// ```
#[derive(Debug, Clone, Default)]
pub enum SigningKeyConfig {
    /// No key material was provided.
    #[default]
    Unconfigured,
    /// Only the public half is known: attestations can be verified and the
    /// key published, but nothing can be signed.
    VerifyOnly(VerifyingKey),
    /// The full signing key is available.
    Signing(SigningKey),
}

impl SigningKeyConfig {
    /// Builds the configuration from optional base64 key strings.
    ///
    /// Empty or whitespace-only strings count as absent. When both halves
    /// are given, the public key must be the one derived from the private
    /// key.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyFormat` - either value is not base64 of 32 bytes
    /// - `KeyMismatch` - the public key does not belong to the private key
    pub fn from_base64(
        private_key: Option<&str>,
        public_key: Option<&str>,
    ) -> Result<Self, AttestationError> {
        let private_key = private_key.map(str::trim).filter(|s| !s.is_empty());
        let public_key = public_key.map(str::trim).filter(|s| !s.is_empty());

        match (private_key, public_key) {
            (None, None) => Ok(Self::Unconfigured),
            (None, Some(public)) => Ok(Self::VerifyOnly(VerifyingKey::from_base64(public)?)),
            (Some(private), public) => {
                let signing_key = SigningKey::from_base64(private)?;
                if let Some(public) = public {
                    let configured = VerifyingKey::from_base64(public)?;
                    if configured != signing_key.verifying_key() {
                        return Err(AttestationError::KeyMismatch);
                    }
                }
                Ok(Self::Signing(signing_key))
            }
        }
    }

    /// Returns true if any key material is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }

    /// Returns true if attestations can be signed.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        matches!(self, Self::Signing(_))
    }

    /// Returns the public half, if known.
    #[must_use]
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        match self {
            Self::Unconfigured => None,
            Self::VerifyOnly(key) => Some(key.clone()),
            Self::Signing(key) => Some(key.verifying_key()),
        }
    }

    /// Returns the signing key.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::SigningKeyNotConfigured` unless the full
    /// signing key is available.
    pub fn signing_key(&self) -> Result<&SigningKey, AttestationError> {
        match self {
            Self::Signing(key) => Ok(key),
            Self::Unconfigured | Self::VerifyOnly(_) => {
                Err(AttestationError::SigningKeyNotConfigured)
            }
        }
    }

    /// Builds an [`Issuer`] named `issued_by` around the signing key.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::SigningKeyNotConfigured` unless the full
    /// signing key is available.
    pub fn issuer(&self, issued_by: impl Into<String>) -> Result<Issuer, AttestationError> {
        Ok(Issuer::new(issued_by, self.signing_key()?.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_values_are_unconfigured() {
        assert!(matches!(
            SigningKeyConfig::from_base64(None, None),
            Ok(SigningKeyConfig::Unconfigured)
        ));
        assert!(matches!(
            SigningKeyConfig::from_base64(Some("  "), Some("")),
            Ok(SigningKeyConfig::Unconfigured)
        ));
    }

    #[test]
    fn public_only_is_verify_only() {
        let key = SigningKey::generate();
        let config =
            SigningKeyConfig::from_base64(None, Some(&key.verifying_key().to_base64())).unwrap();

        assert!(config.is_configured());
        assert!(!config.can_sign());
        assert_eq!(config.verifying_key(), Some(key.verifying_key()));
        assert_eq!(
            config.signing_key().unwrap_err(),
            AttestationError::SigningKeyNotConfigured
        );
    }

    #[test]
    fn matching_pair_signs() {
        let key = SigningKey::generate();
        let config = SigningKeyConfig::from_base64(
            Some(&key.to_base64()),
            Some(&key.verifying_key().to_base64()),
        )
        .unwrap();

        let issuer = config.issuer("https://linker.example").unwrap();
        assert_eq!(issuer.verifying_key(), key.verifying_key());
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let key = SigningKey::generate();
        let other = SigningKey::generate();

        assert_eq!(
            SigningKeyConfig::from_base64(
                Some(&key.to_base64()),
                Some(&other.verifying_key().to_base64()),
            )
            .unwrap_err(),
            AttestationError::KeyMismatch
        );
    }

    #[test]
    fn malformed_private_key_is_rejected() {
        assert!(matches!(
            SigningKeyConfig::from_base64(Some("not a key"), None),
            Err(AttestationError::InvalidKeyFormat { .. })
        ));
    }

    #[test]
    fn unconfigured_cannot_build_issuer() {
        assert_eq!(
            SigningKeyConfig::Unconfigured
                .issuer("https://linker.example")
                .unwrap_err(),
            AttestationError::SigningKeyNotConfigured
        );
    }
}
