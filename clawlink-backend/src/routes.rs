//! HTTP routes.
//!
//! | Route | Auth | Behaviour |
//! |-------|------|-----------|
//! | `GET /health` | none | liveness |
//! | `GET /.well-known/clawlink-keys.json` | none | published verification key |
//! | `POST /api/clawbots/register` | none | new bot id and claim code |
//! | `POST /api/clawbots/claim` | owner | claim a bot by code |
//! | `GET /api/clawbots` | owner | bots owned by the caller |
//! | `GET /api/clawbots/{id}` | owner | one owned bot |
//! | `POST /api/clawbots/{id}/refresh-code` | owner | fresh claim code |
//! | `GET /api/clawbots/{id}/attestation` | none | stored attestation of a claimed bot |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clawlink::BotId;
use clawlink_attestation::{JwkSet, OwnershipAttestation};
use clawlink_registry::{BotRecord, IssuedClaimCode, Registration, RegistryError};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthenticatedOwner;
use crate::dto::{ClaimBody, ClaimResponse, HealthResponse, RegisterBody};
use crate::error::ApiError;
use crate::state::AppState;

/// Path of the published key set.
pub const KEYS_PATH: &str = "/.well-known/clawlink-keys.json";

/// Builds the backend router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(KEYS_PATH, get(published_keys))
        .route("/api/clawbots", get(list_clawbots))
        .route("/api/clawbots/register", post(register))
        .route("/api/clawbots/claim", post(claim))
        .route("/api/clawbots/{id}", get(get_clawbot))
        .route("/api/clawbots/{id}/refresh-code", post(refresh_code))
        .route("/api/clawbots/{id}/attestation", get(attestation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the backend on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error if the server fails.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "clawlink backend listening");
    }
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn published_keys(State(state): State<AppState>) -> Result<Json<JwkSet>, ApiError> {
    let keys = state
        .keys()
        .jwk_set()
        .map_err(|_| ApiError::KeysNotConfigured)?;
    Ok(Json(keys))
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<Json<Registration>, ApiError> {
    let Json(body) = body?;
    let (Some(public_key), Some(name)) = (body.public_key, body.name) else {
        return Err(ApiError::MissingFields("publicKey and name are required"));
    };

    let registration = state
        .registrar()
        .register(&public_key, &name, body.endpoint.as_deref())?;
    Ok(Json(registration))
}

async fn claim(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    body: Result<Json<ClaimBody>, JsonRejection>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let Json(body) = body?;
    let code = body.claim_code.unwrap_or_default();

    // The delivery task runs detached; the claim is already committed.
    let outcome = state.claims().claim(&owner, &code)?;
    Ok(Json(ClaimResponse {
        bot_record: outcome.record,
        attestation: outcome.attestation,
    }))
}

async fn list_clawbots(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Result<Json<Vec<BotRecord>>, ApiError> {
    Ok(Json(state.directory().list_owned(&owner)?))
}

async fn get_clawbot(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot_id = path_bot_id(&id)?;
    Ok(Json(state.directory().get_owned(&bot_id, &owner)?))
}

async fn refresh_code(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<String>,
) -> Result<Json<IssuedClaimCode>, ApiError> {
    let bot_id = path_bot_id(&id)?;
    Ok(Json(
        state.registrar().refresh_claim_code(&bot_id, Some(&owner))?,
    ))
}

async fn attestation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OwnershipAttestation>, ApiError> {
    let bot_id = path_bot_id(&id)?;
    Ok(Json(state.directory().attestation(&bot_id)?))
}

/// Malformed ids cannot name a stored bot.
fn path_bot_id(id: &str) -> Result<BotId, ApiError> {
    BotId::parse(id).map_err(|_| ApiError::Registry(RegistryError::not_found(id)))
}
