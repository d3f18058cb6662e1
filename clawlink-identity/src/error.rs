//! Error types for the bot-side identity.

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised while loading, persisting or using the bot identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// A file could not be read or written.
    Io {
        /// The file involved
        path: PathBuf,
        /// Underlying error description
        reason: String,
    },
    /// Only one half of the persisted keypair exists.
    IncompleteKeypair {
        /// The file that is missing
        missing: PathBuf,
    },
    /// Persisted key material is malformed.
    CorruptKey {
        /// The file involved
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
    /// The cached attestation file is not a valid attestation.
    CorruptAttestation {
        /// The cache file
        path: PathBuf,
        /// Parser error description
        reason: String,
    },
    /// A value could not be encoded.
    Serialization {
        /// Error description
        reason: String,
    },
    /// The HTTP client could not be built.
    Client {
        /// Error description
        reason: String,
    },
    /// The linker backend could not be reached.
    Request {
        /// The URL that was requested
        url: String,
        /// Error description
        reason: String,
    },
    /// The linker backend refused the registration.
    Registration {
        /// HTTP status returned
        status: u16,
        /// Error message from the response body
        message: String,
    },
    /// The linker backend answered with an unexpected status.
    UnexpectedResponse {
        /// The URL that was requested
        url: String,
        /// HTTP status returned
        status: u16,
    },
    /// The backend returned an attestation for another bot or key.
    ForeignAttestation {
        /// The bot id that was requested
        bot_id: String,
        /// Which field did not match
        reason: String,
    },
    /// In-memory state is unusable.
    Storage {
        /// Error description
        message: String,
    },
}

impl IdentityError {
    /// Creates an `Io` error for `path`.
    #[must_use]
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "{}: {reason}", path.display()),
            Self::IncompleteKeypair { missing } => write!(
                f,
                "keypair is incomplete: {} is missing; restore it, or delete the other key file \
                 to start over with a new identity (existing attestations will no longer match)",
                missing.display()
            ),
            Self::CorruptKey { path, reason } => write!(
                f,
                "key file {} is unusable: {reason}; refusing to generate a replacement",
                path.display()
            ),
            Self::CorruptAttestation { path, reason } => write!(
                f,
                "attestation cache {} is unreadable: {reason}; run `clawlink-identity sync` to re-fetch it",
                path.display()
            ),
            Self::Serialization { reason } => write!(f, "serialization failed: {reason}"),
            Self::Client { reason } => write!(f, "could not build HTTP client: {reason}"),
            Self::Request { url, reason } => write!(f, "request to {url} failed: {reason}"),
            Self::Registration { status, message } => {
                write!(f, "Registration failed ({status}): {message}")
            }
            Self::UnexpectedResponse { url, status } => {
                write!(f, "{url} answered with unexpected status {status}")
            }
            Self::ForeignAttestation { bot_id, reason } => write!(
                f,
                "attestation returned for {bot_id} does not belong to this bot ({reason}); \
                 check the bot id and the key files in the identity home"
            ),
            Self::Storage { message } => write!(f, "identity storage error: {message}"),
        }
    }
}

impl std::error::Error for IdentityError {}
