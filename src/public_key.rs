//! Algorithm-prefixed public keys (`ed25519:<base64>`).

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::constants::{ED25519_ALGORITHM, ED25519_KEY_LENGTH};
use crate::error::ValidationError;

/// Signature algorithms accepted for bot keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// Ed25519 (RFC 8032).
    Ed25519,
}

impl KeyAlgorithm {
    /// Returns the wire prefix for this algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => ED25519_ALGORITHM,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            ED25519_ALGORITHM => Some(Self::Ed25519),
            _ => None,
        }
    }
}

/// A bot public key in its wire form, validated and decoded.
///
/// The original string is kept verbatim so it can be echoed into
/// attestations exactly as the bot presented it.
///
/// # Examples
///
/// ```
/// use clawlink::{EncodedPublicKey, KeyAlgorithm};
///
/// let key = EncodedPublicKey::from_ed25519_bytes(&[7u8; 32]);
/// assert!(key.as_str().starts_with("ed25519:"));
/// assert_eq!(key.algorithm(), KeyAlgorithm::Ed25519);
///
/// let parsed = EncodedPublicKey::parse(key.as_str()).unwrap();
/// assert_eq!(parsed.key_bytes(), &[7u8; 32]);
///
/// assert!(EncodedPublicKey::parse("rsa:AAAA").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPublicKey {
    encoded: String,
    algorithm: KeyAlgorithm,
    bytes: [u8; ED25519_KEY_LENGTH],
}

impl EncodedPublicKey {
    /// Parses an `<algorithm>:<base64>` public key.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the prefix is missing or unknown, the
    /// body is not standard base64, or it does not decode to 32 bytes.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let (prefix, body) = input
            .split_once(':')
            .ok_or(ValidationError::MissingKeyAlgorithm)?;

        let algorithm = KeyAlgorithm::from_prefix(prefix).ok_or_else(|| {
            ValidationError::UnsupportedKeyAlgorithm {
                algorithm: prefix.to_string(),
            }
        })?;

        let decoded = STANDARD
            .decode(body)
            .map_err(|e| ValidationError::InvalidKeyEncoding {
                reason: e.to_string(),
            })?;

        let bytes: [u8; ED25519_KEY_LENGTH] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| ValidationError::InvalidKeyLength {
                    expected: ED25519_KEY_LENGTH,
                    actual: decoded.len(),
                })?;

        Ok(Self {
            encoded: input.to_string(),
            algorithm,
            bytes,
        })
    }

    /// Encodes raw Ed25519 public key bytes.
    #[must_use]
    pub fn from_ed25519_bytes(bytes: &[u8; ED25519_KEY_LENGTH]) -> Self {
        Self {
            encoded: format!("{ED25519_ALGORITHM}:{}", STANDARD.encode(bytes)),
            algorithm: KeyAlgorithm::Ed25519,
            bytes: *bytes,
        }
    }

    /// Returns the wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Returns the key algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn key_bytes(&self) -> &[u8; ED25519_KEY_LENGTH] {
        &self.bytes
    }
}

impl fmt::Display for EncodedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for EncodedPublicKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EncodedPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encoded)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EncodedPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_wire_form() {
        let key = EncodedPublicKey::from_ed25519_bytes(&[42u8; 32]);
        let parsed = EncodedPublicKey::parse(key.as_str()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn missing_prefix_rejected() {
        let body = STANDARD.encode([1u8; 32]);
        assert_eq!(
            EncodedPublicKey::parse(&body),
            Err(ValidationError::MissingKeyAlgorithm)
        );
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let input = format!("secp256k1:{}", STANDARD.encode([1u8; 32]));
        assert!(matches!(
            EncodedPublicKey::parse(&input),
            Err(ValidationError::UnsupportedKeyAlgorithm { algorithm }) if algorithm == "secp256k1"
        ));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let input = format!("ED25519:{}", STANDARD.encode([1u8; 32]));
        assert!(EncodedPublicKey::parse(&input).is_err());
    }

    #[test]
    fn bad_base64_rejected() {
        assert!(matches!(
            EncodedPublicKey::parse("ed25519:not base64!"),
            Err(ValidationError::InvalidKeyEncoding { .. })
        ));
    }

    #[test]
    fn short_key_rejected() {
        let input = format!("ed25519:{}", STANDARD.encode([1u8; 16]));
        assert_eq!(
            EncodedPublicKey::parse(&input),
            Err(ValidationError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        );
    }
}
