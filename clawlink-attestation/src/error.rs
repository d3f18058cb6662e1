//! Error types for attestation operations.

use std::fmt;

/// Errors that can occur during attestation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationError {
    /// No backend signing key was configured for this process.
    SigningKeyNotConfigured,
    /// Key material is malformed.
    InvalidKeyFormat {
        /// Description of the key error
        reason: String,
    },
    /// Configured private and public keys do not belong together.
    KeyMismatch,
    /// Signature verification failed.
    InvalidSignature,
    /// Signature field is not a base64-encoded 64-byte signature.
    InvalidSignatureEncoding {
        /// Description of the encoding error
        reason: String,
    },
    /// A timestamp field could not be parsed.
    InvalidTimestamp {
        /// Name of the offending field
        field: &'static str,
        /// Description of the parsing error
        reason: String,
    },
    /// The validity window could not be computed from the issuance time.
    InvalidValidity,
    /// The payload could not be serialized.
    Serialization {
        /// Description of the serialization error
        reason: String,
    },
    /// The issuer is not in the trusted set.
    UntrustedIssuer {
        /// The untrusted issuer
        issuer: String,
    },
    /// The `type` tag is not one this crate understands.
    UnsupportedType {
        /// The tag that was found
        found: String,
    },
    /// The attestation has expired.
    Expired {
        /// When the attestation expired
        expired_at: String,
    },
    /// The attestation is not yet valid.
    NotYetValid {
        /// When the attestation becomes valid
        valid_from: String,
    },
    /// Attested bot differs from the expected bot.
    SubjectMismatch {
        /// Bot id in the attestation
        attested: String,
        /// Expected bot id
        expected: String,
    },
    /// Attested owner differs from the expected owner.
    OwnerMismatch {
        /// Owner id in the attestation
        attested: String,
        /// Expected owner id
        expected: String,
    },
    /// Attested public key differs from the key presented by the bot.
    PublicKeyMismatch {
        /// Public key in the attestation
        attested: String,
        /// Public key the bot presented
        presented: String,
    },
    /// A JWK does not describe an Ed25519 key.
    UnsupportedJwk {
        /// Description of the problem
        reason: String,
    },
}

impl fmt::Display for AttestationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SigningKeyNotConfigured => {
                write!(
                    f,
                    "attestation signing key not configured; set ATTESTATION_PRIVATE_KEY"
                )
            }
            Self::InvalidKeyFormat { reason } => write!(f, "invalid key format: {reason}"),
            Self::KeyMismatch => {
                write!(
                    f,
                    "configured public key does not match the private key; regenerate both together"
                )
            }
            Self::InvalidSignature => {
                write!(
                    f,
                    "signature verification failed; attestation may have been tampered with"
                )
            }
            Self::InvalidSignatureEncoding { reason } => {
                write!(f, "invalid signature encoding: {reason}")
            }
            Self::InvalidTimestamp { field, reason } => {
                write!(f, "invalid {field} timestamp: {reason}")
            }
            Self::InvalidValidity => write!(f, "validity window is out of range"),
            Self::Serialization { reason } => {
                write!(f, "failed to serialize attestation payload: {reason}")
            }
            Self::UntrustedIssuer { issuer } => {
                write!(
                    f,
                    "issuer '{issuer}' is not trusted; add it with verifier.add_trusted_issuer()"
                )
            }
            Self::UnsupportedType { found } => {
                write!(f, "unsupported attestation type '{found}'")
            }
            Self::Expired { expired_at } => {
                write!(
                    f,
                    "attestation expired at {expired_at}; the owner must claim the bot again"
                )
            }
            Self::NotYetValid { valid_from } => {
                write!(f, "attestation not yet valid; valid from {valid_from}")
            }
            Self::SubjectMismatch { attested, expected } => {
                write!(
                    f,
                    "attestation is for bot '{attested}' but expected '{expected}'"
                )
            }
            Self::OwnerMismatch { attested, expected } => {
                write!(
                    f,
                    "attestation names owner '{attested}' but expected '{expected}'"
                )
            }
            Self::PublicKeyMismatch {
                attested,
                presented,
            } => {
                write!(
                    f,
                    "attested public key '{attested}' does not match presented key '{presented}'"
                )
            }
            Self::UnsupportedJwk { reason } => write!(f, "unsupported JWK: {reason}"),
        }
    }
}

impl std::error::Error for AttestationError {}
