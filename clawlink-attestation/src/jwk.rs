//! Publication of the backend verification key as a JSON Web Key.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SigningKeyConfig;
use crate::error::AttestationError;
use crate::keys::VerifyingKey;

const KEY_TYPE: &str = "OKP";
const CURVE: &str = "Ed25519";
const ALGORITHM: &str = "EdDSA";
const KEY_USE: &str = "sig";

/// An Ed25519 public key in JWK form (RFC 8037).
///
/// `x` is the base64url (unpadded) raw 32-byte key. Published keys always
/// carry `alg`, `use` and a `kid` equal to the RFC 7638 thumbprint; keys
/// read from elsewhere may omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `OKP`
    pub kty: String,
    /// Curve, always `Ed25519`
    pub crv: String,
    /// Base64url raw public key
    pub x: String,
    /// Signature algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Intended key use
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Key id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// Describes `key` as a signing JWK.
    ///
    /// # Example
    ///
    /// ```
    /// use clawlink_attestation::{Jwk, SigningKey};
    ///
    /// let key = SigningKey::generate().verifying_key();
    /// let jwk = Jwk::from_verifying_key(&key);
    ///
    /// assert_eq!(jwk.kty, "OKP");
    /// assert_eq!(jwk.crv, "Ed25519");
    /// assert_eq!(jwk.to_verifying_key().unwrap(), key);
    /// ```
    #[must_use]
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let x = URL_SAFE_NO_PAD.encode(key.to_bytes());
        let kid = thumbprint(&x);
        Self {
            kty: KEY_TYPE.to_string(),
            crv: CURVE.to_string(),
            x,
            alg: Some(ALGORITHM.to_string()),
            key_use: Some(KEY_USE.to_string()),
            kid: Some(kid),
        }
    }

    /// Recovers the verifying key.
    ///
    /// # Errors
    ///
    /// - `UnsupportedJwk` - not an `OKP`/`Ed25519` key, or `x` is not
    ///   base64url of 32 bytes
    /// - `InvalidKeyFormat` - `x` is not a valid curve point
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, AttestationError> {
        if self.kty != KEY_TYPE || self.crv != CURVE {
            return Err(AttestationError::UnsupportedJwk {
                reason: format!("expected kty OKP and crv Ed25519, got {} {}", self.kty, self.crv),
            });
        }
        if let Some(alg) = self.alg.as_deref().filter(|alg| *alg != ALGORITHM) {
            return Err(AttestationError::UnsupportedJwk {
                reason: format!("expected alg EdDSA, got {alg}"),
            });
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(self.x.trim_end_matches('='))
            .map_err(|e| AttestationError::UnsupportedJwk {
                reason: format!("x is not base64url: {e}"),
            })?;
        let bytes: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| AttestationError::UnsupportedJwk {
                    reason: format!("x must be 32 bytes, got {}", bytes.len()),
                })?;
        VerifyingKey::from_bytes(&bytes)
    }

    /// Returns the RFC 7638 SHA-256 thumbprint of this key.
    #[must_use]
    pub fn thumbprint(&self) -> String {
        thumbprint(&self.x)
    }
}

/// A published key set: `{"keys": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JwkSet {
    /// The published keys
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Finds a key by `kid`.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// Exposes the backend's public verification key.
///
/// # Example
///
/// ```
/// use clawlink_attestation::{AttestationError, KeyPublisher, SigningKey, SigningKeyConfig};
///
/// let publisher = KeyPublisher::new(&SigningKeyConfig::Unconfigured);
/// assert!(publisher.public_key_jwk().is_none());
/// assert_eq!(publisher.jwk_set(), Err(AttestationError::SigningKeyNotConfigured));
///
/// let publisher = KeyPublisher::new(&SigningKeyConfig::Signing(SigningKey::generate()));
/// assert_eq!(publisher.jwk_set().unwrap().keys.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct KeyPublisher {
    jwk: Option<Jwk>,
}

impl KeyPublisher {
    /// Creates a publisher for the configured key, if any.
    #[must_use]
    pub fn new(config: &SigningKeyConfig) -> Self {
        Self {
            jwk: config
                .verifying_key()
                .map(|key| Jwk::from_verifying_key(&key)),
        }
    }

    /// Returns the public key as a JWK, or `None` when no key is configured.
    #[must_use]
    pub fn public_key_jwk(&self) -> Option<Jwk> {
        self.jwk.clone()
    }

    /// Returns the published key set.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::SigningKeyNotConfigured` when no key is
    /// configured.
    pub fn jwk_set(&self) -> Result<JwkSet, AttestationError> {
        let jwk = self
            .public_key_jwk()
            .ok_or(AttestationError::SigningKeyNotConfigured)?;
        Ok(JwkSet { keys: vec![jwk] })
    }
}

fn thumbprint(x: &str) -> String {
    // Required members only, lexicographic order, no whitespace.
    let canonical = format!(r#"{{"crv":"{CURVE}","kty":"{KEY_TYPE}","x":"{x}"}}"#);
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}
