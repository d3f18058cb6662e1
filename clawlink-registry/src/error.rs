//! Error types for registry operations.

use std::fmt;

use clawlink::ValidationError;
use clawlink_attestation::AttestationError;

/// Coarse classification of a [`RegistryError`].
///
/// Boundaries map each kind to a client-facing outcome: validation errors
/// ask the caller to fix input, state errors are expected not-found/gone
/// outcomes, configuration and storage errors are server faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, rejected before any storage access.
    Validation,
    /// Expected outcome of the claim state machine.
    State,
    /// Missing or unusable server configuration.
    Configuration,
    /// The record store failed.
    Storage,
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Input failed validation.
    Validation(ValidationError),
    /// No pending bot holds this code. Also returned when the code was
    /// already used, so callers cannot tell the two apart.
    InvalidOrExpiredCode,
    /// The code matched a pending bot but its window has passed.
    CodeExpired {
        /// When the code expired
        expired_at: String,
    },
    /// The bot does not exist (or is not visible to the caller).
    NotFound {
        /// The bot id that was requested
        bot_id: String,
    },
    /// The bot already has an owner.
    AlreadyClaimed {
        /// The claimed bot
        bot_id: String,
    },
    /// A freshly generated claim code is held by another pending bot.
    CodeCollision,
    /// A bot with this id is already stored.
    DuplicateBot {
        /// The duplicate bot id
        bot_id: String,
    },
    /// Attestation could not be issued.
    Attestation(AttestationError),
    /// Registry configuration is unusable.
    InvalidConfiguration {
        /// What is wrong
        reason: String,
    },
    /// The record store failed.
    Storage {
        /// Error message
        message: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidOrExpiredCode => write!(f, "Invalid or expired claim code"),
            Self::CodeExpired { expired_at } => {
                write!(
                    f,
                    "Claim code has expired (at {expired_at}); ask the bot for a fresh code"
                )
            }
            Self::NotFound { bot_id } => write!(f, "clawbot '{bot_id}' not found"),
            Self::AlreadyClaimed { bot_id } => {
                write!(f, "clawbot '{bot_id}' is already claimed")
            }
            Self::CodeCollision => {
                write!(f, "could not allocate an unused claim code; retry shortly")
            }
            Self::DuplicateBot { bot_id } => {
                write!(f, "clawbot '{bot_id}' is already registered")
            }
            Self::Attestation(err) => write!(f, "{err}"),
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid registry configuration: {reason}")
            }
            Self::Storage { message } => write!(f, "storage error: {message}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Attestation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<AttestationError> for RegistryError {
    fn from(err: AttestationError) -> Self {
        Self::Attestation(err)
    }
}

impl RegistryError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(bot_id: impl fmt::Display) -> Self {
        Self::NotFound {
            bot_id: bot_id.to_string(),
        }
    }

    /// Creates an `AlreadyClaimed` error.
    #[must_use]
    pub fn already_claimed(bot_id: impl fmt::Display) -> Self {
        Self::AlreadyClaimed {
            bot_id: bot_id.to_string(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidOrExpiredCode
            | Self::CodeExpired { .. }
            | Self::NotFound { .. }
            | Self::AlreadyClaimed { .. } => ErrorKind::State,
            Self::Attestation(_) | Self::InvalidConfiguration { .. } => ErrorKind::Configuration,
            Self::CodeCollision | Self::DuplicateBot { .. } | Self::Storage { .. } => {
                ErrorKind::Storage
            }
        }
    }

    /// Returns true for the missing signing key condition.
    #[must_use]
    pub const fn is_signing_key_not_configured(&self) -> bool {
        matches!(
            self,
            Self::Attestation(AttestationError::SigningKeyNotConfigured)
        )
    }
}

/// Failure to push an attestation to a bot endpoint.
///
/// Never surfaced to the claimant; only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The HTTP client could not be built.
    Client {
        /// Error message
        reason: String,
    },
    /// The request failed or timed out.
    Request {
        /// Target URL
        url: String,
        /// Error message
        reason: String,
    },
    /// The bot answered with a non-success status.
    Rejected {
        /// Target URL
        url: String,
        /// HTTP status code
        status: u16,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { reason } => write!(f, "failed to build delivery client: {reason}"),
            Self::Request { url, reason } => {
                write!(f, "could not deliver attestation to {url}: {reason}")
            }
            Self::Rejected { url, status } => {
                write!(f, "bot at {url} rejected attestation with status {status}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
