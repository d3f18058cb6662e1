//! HTTP error mapping for the backend routes.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clawlink_registry::{ErrorKind, RegistryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::AuthError;

/// Errors returned by the backend routes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller is not authenticated.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request body could not be read as JSON.
    #[error("Invalid JSON body")]
    InvalidBody(String),

    /// Required body fields are missing.
    #[error("{0}")]
    MissingFields(&'static str),

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// No attestation key is configured, so none can be published.
    #[error("Public key not configured")]
    KeysNotConfigured,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
}

impl ApiError {
    /// Returns the status code and machine-readable code for this error.
    #[must_use]
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::InvalidBody(_) | Self::MissingFields(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            Self::KeysNotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, "KEYS_NOT_CONFIGURED"),
            Self::Registry(err) => registry_status(err),
        }
    }
}

fn registry_status(err: &RegistryError) -> (StatusCode, &'static str) {
    if err.is_signing_key_not_configured() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SIGNING_KEY_NOT_CONFIGURED",
        );
    }
    match err {
        RegistryError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        RegistryError::InvalidOrExpiredCode => (StatusCode::NOT_FOUND, "INVALID_CLAIM_CODE"),
        RegistryError::CodeExpired { .. } => (StatusCode::GONE, "CLAIM_CODE_EXPIRED"),
        RegistryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RegistryError::AlreadyClaimed { .. } => (StatusCode::CONFLICT, "ALREADY_CLAIMED"),
        RegistryError::CodeCollision => (StatusCode::SERVICE_UNAVAILABLE, "CODE_COLLISION"),
        RegistryError::Attestation(_) | RegistryError::InvalidConfiguration { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
        }
        RegistryError::DuplicateBot { .. } | RegistryError::Storage { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        match &self {
            Self::Registry(err) if err.kind() == ErrorKind::State => {
                debug!(error = %err, "claim state rejection");
            }
            Self::Registry(err) if status.is_server_error() => {
                error!(error = %err, code, "request failed");
            }
            Self::KeysNotConfigured => error!("key set requested but no attestation key is configured"),
            Self::InvalidBody(detail) => debug!(detail = %detail, "rejected request body"),
            _ => {}
        }

        let message = match &self {
            Self::Registry(RegistryError::NotFound { .. }) => "Clawbot not found".to_string(),
            Self::Registry(RegistryError::CodeExpired { .. }) => {
                "Claim code has expired".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
