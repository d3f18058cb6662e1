//! The bot's identity HTTP server.
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /identity` | cached attestation, or 404 before the bot is claimed |
//! | `POST /challenge` | signs the caller's nonce with the bot key |
//! | `POST /attestation` | replaces the cached attestation |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clawlink_attestation::OwnershipAttestation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::cache::{AttestationCache, with_cache};
use crate::error::IdentityError;
use crate::keypair::Keypair;

/// Shared state for the identity routes.
#[derive(Clone)]
pub struct IdentityState {
    keypair: Arc<Keypair>,
    cache: Arc<dyn AttestationCache>,
}

impl IdentityState {
    /// Creates state over the bot keypair and attestation cache.
    #[must_use]
    pub fn new(keypair: Keypair, cache: Arc<dyn AttestationCache>) -> Self {
        Self {
            keypair: Arc::new(keypair),
            cache,
        }
    }
}

/// Errors returned by the identity routes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No attestation has been received yet.
    #[error("Not yet claimed")]
    NotClaimed,

    /// The challenge carried no nonce.
    #[error("nonce is required")]
    MissingNonce,

    /// Local storage failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotClaimed => (StatusCode::NOT_FOUND, "NOT_CLAIMED"),
            Self::MissingNonce => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Identity(err) => {
                error!(error = %err, "identity storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /challenge` request.
#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    /// Caller-chosen, unpredictable nonce
    #[serde(default)]
    pub nonce: String,
}

/// `POST /challenge` response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// The nonce, echoed back
    pub nonce: String,
    /// Base64 Ed25519 signature over the nonce's UTF-8 bytes
    pub signature: String,
    /// The bot public key, `ed25519:<base64>`
    pub public_key: String,
}

/// `POST /attestation` body: the attestation itself or wrapped in
/// `{"attestation": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AttestationPush {
    Wrapped { attestation: OwnershipAttestation },
    Bare(OwnershipAttestation),
}

impl AttestationPush {
    fn into_inner(self) -> OwnershipAttestation {
        match self {
            Self::Wrapped { attestation } | Self::Bare(attestation) => attestation,
        }
    }
}

/// Acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    /// Always true
    pub ok: bool,
}

/// Builds the identity router.
pub fn create_router(state: IdentityState) -> Router {
    Router::new()
        .route("/identity", get(identity))
        .route("/challenge", post(challenge))
        .route("/attestation", post(receive_attestation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the identity routes on `listener` until the task is dropped.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, state: IdentityState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "identity server listening");
    }
    axum::serve(listener, create_router(state)).await
}

async fn identity(
    State(state): State<IdentityState>,
) -> Result<Json<OwnershipAttestation>, ApiError> {
    with_cache(&state.cache, |c| c.load())
        .await?
        .map(Json)
        .ok_or(ApiError::NotClaimed)
}

async fn challenge(
    State(state): State<IdentityState>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    if request.nonce.is_empty() {
        return Err(ApiError::MissingNonce);
    }

    let signature = state.keypair.sign_base64(request.nonce.as_bytes());
    Ok(Json(ChallengeResponse {
        nonce: request.nonce,
        signature,
        public_key: state.keypair.public_key().to_string(),
    }))
}

async fn receive_attestation(
    State(state): State<IdentityState>,
    Json(push): Json<AttestationPush>,
) -> Result<Json<Ack>, ApiError> {
    let attestation = push.into_inner();
    // Stored without signature verification.
    let attestation = with_cache(&state.cache, move |cache| {
        cache.store(&attestation).map(|()| attestation)
    })
    .await?;
    info!(
        owner = %attestation.alien_id,
        bot_id = %attestation.clawbot_id,
        "attestation received; bot is claimed"
    );
    Ok(Json(Ack { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_and_bare_pushes_decode() {
        let bare = serde_json::json!({
            "type": "clawlink-ownership-v1",
            "alienId": "alien-1",
            "clawbotId": "cbot_x",
            "publicKey": "ed25519:AA==",
            "issuedBy": "http://localhost:3000",
            "issuedAt": "2025-01-01T00:00:00.000Z",
            "expiresAt": "2026-01-01T00:00:00.000Z",
            "signature": "c2ln"
        });
        let wrapped = serde_json::json!({ "attestation": bare.clone() });

        let a: AttestationPush = serde_json::from_value(bare).unwrap();
        let b: AttestationPush = serde_json::from_value(wrapped).unwrap();

        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn error_codes() {
        assert_eq!(
            ApiError::NotClaimed.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MissingNonce.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(IdentityError::storage("x"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
