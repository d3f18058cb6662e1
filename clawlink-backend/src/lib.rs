//! Linker backend for clawlink.
//!
//! Exposes bot registration, the owner claim transaction and the published
//! attestation key over HTTP. All decisions live in `clawlink-registry` and
//! `clawlink-attestation`; this crate maps them onto routes, owner
//! authentication and status codes.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use clawlink_attestation::{SigningKey, SigningKeyConfig};
//! use clawlink_backend::{AppState, TokenAuthenticator, create_router};
//! use clawlink_registry::{InMemoryBotStore, RegistryConfig, SystemClock};
//!
//! let state = AppState::new(
//!     Arc::new(InMemoryBotStore::new()),
//!     Arc::new(SystemClock),
//!     &SigningKeyConfig::Signing(SigningKey::generate()),
//!     RegistryConfig::default(),
//!     Arc::new(TokenAuthenticator::new().with_dev_tokens(true)),
//! );
//! let router = create_router(state);
//! # let _ = router;
//! ```
//!
//! # Status codes
//!
//! | Outcome | Status | `code` |
//! |---------|--------|--------|
//! | malformed input | 400 | `VALIDATION_ERROR` |
//! | missing or rejected owner token | 401 | `UNAUTHORIZED` |
//! | unknown or used claim code | 404 | `INVALID_CLAIM_CODE` |
//! | unknown or foreign bot | 404 | `NOT_FOUND` |
//! | already claimed (own bot) | 409 | `ALREADY_CLAIMED` |
//! | expired claim code | 410 | `CLAIM_CODE_EXPIRED` |
//! | no signing key | 500 | `SIGNING_KEY_NOT_CONFIGURED` |
//! | no published key | 500 | `KEYS_NOT_CONFIGURED` |

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod auth;
mod config;
mod dto;
mod error;
mod routes;
mod state;

pub use auth::{
    AuthError, AuthenticatedOwner, DEV_OWNER_ID, DEV_TOKEN_SUFFIX, OwnerAuthenticator,
    TokenAuthenticator, bearer_token, create_dev_token, dev_token_owner,
};
pub use config::{BackendConfig, ConfigError, ServeArgs, parse_owner_tokens};
pub use dto::{ClaimBody, ClaimResponse, HealthResponse, RegisterBody};
pub use error::{ApiError, ErrorResponse};
pub use routes::{KEYS_PATH, create_router, serve};
pub use state::AppState;
