//! Validation errors for wire values.

use std::fmt;

/// Errors raised when an input value does not have the required shape.
///
/// These are always reported before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Claim code is not exactly six ASCII digits.
    InvalidClaimCode,
    /// Public key has no `<algorithm>:` prefix.
    MissingKeyAlgorithm,
    /// Public key prefix names an algorithm we do not accept.
    UnsupportedKeyAlgorithm {
        /// The algorithm prefix that was found
        algorithm: String,
    },
    /// Public key body is not valid base64.
    InvalidKeyEncoding {
        /// Decoder error description
        reason: String,
    },
    /// Public key body decodes to the wrong number of bytes.
    InvalidKeyLength {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },
    /// Bot name is empty after trimming.
    EmptyName,
    /// Bot name exceeds the maximum length.
    NameTooLong {
        /// Maximum allowed characters
        max: usize,
        /// Actual characters
        actual: usize,
    },
    /// Owner identifier is empty.
    EmptyOwnerId,
    /// Owner identifier exceeds the maximum length.
    OwnerIdTooLong {
        /// Maximum allowed bytes
        max: usize,
        /// Actual bytes
        actual: usize,
    },
    /// Endpoint is not an `http(s)` URL.
    InvalidEndpoint {
        /// Why it was rejected
        reason: &'static str,
    },
    /// Bot identifier is malformed.
    InvalidBotId {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClaimCode => write!(f, "claimCode must be a 6-digit string"),
            Self::MissingKeyAlgorithm => {
                write!(f, "publicKey must be prefixed with 'ed25519:'")
            }
            Self::UnsupportedKeyAlgorithm { algorithm } => {
                write!(
                    f,
                    "publicKey algorithm '{algorithm}' is not supported; use 'ed25519:'"
                )
            }
            Self::InvalidKeyEncoding { reason } => {
                write!(f, "publicKey is not valid base64: {reason}")
            }
            Self::InvalidKeyLength { expected, actual } => {
                write!(
                    f,
                    "publicKey must decode to {expected} bytes, got {actual}"
                )
            }
            Self::EmptyName => write!(f, "name is required"),
            Self::NameTooLong { max, actual } => {
                write!(f, "name is {actual} characters; maximum is {max}")
            }
            Self::EmptyOwnerId => write!(f, "owner identifier is empty"),
            Self::OwnerIdTooLong { max, actual } => {
                write!(f, "owner identifier is {actual} bytes; maximum is {max}")
            }
            Self::InvalidEndpoint { reason } => write!(f, "endpoint {reason}"),
            Self::InvalidBotId { value, reason } => {
                write!(f, "invalid bot id '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
