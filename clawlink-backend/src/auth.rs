//! Owner authentication.
//!
//! Owner tokens are verified by an external identity provider; this module
//! only defines the seam ([`OwnerAuthenticator`]) and a token-table
//! implementation with optional unsigned development tokens.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use clawlink::OwnerId;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ApiError;
use crate::state::AppState;

/// Owner id used for development tokens without a `sub` claim.
pub const DEV_OWNER_ID: &str = "dev-alien-user-00000";

/// Suffix that marks an unsigned development token.
pub const DEV_TOKEN_SUFFIX: &str = ".dev";

/// Why a request could not be attributed to an owner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("Missing authorization token")]
    MissingToken,
    /// The token is unknown, malformed or expired.
    #[error("Invalid or expired token")]
    InvalidToken,
    /// A development token whose payload cannot be read.
    #[error("Invalid dev token")]
    InvalidDevToken,
}

/// Turns a bearer token into an owner identity.
pub trait OwnerAuthenticator: Send + Sync {
    /// Returns the owner the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is not accepted.
    fn authenticate(&self, token: &str) -> Result<OwnerId, AuthError>;
}

/// Accepts a fixed table of tokens and, when enabled, development tokens
/// of the form `<header>.<payload>.dev`.
///
/// # Examples
///
/// ```
/// use clawlink::OwnerId;
/// use clawlink_backend::{OwnerAuthenticator, TokenAuthenticator, create_dev_token};
///
/// let auth = TokenAuthenticator::new()
///     .with_token("s3cret", OwnerId::parse("alien-1").unwrap())
///     .with_dev_tokens(true);
///
/// assert_eq!(auth.authenticate("s3cret").unwrap().as_str(), "alien-1");
/// assert_eq!(auth.authenticate(&create_dev_token("alien-2")).unwrap().as_str(), "alien-2");
/// assert!(auth.authenticate("guess").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, OwnerId>,
    dev_tokens: bool,
}

impl TokenAuthenticator {
    /// Creates an authenticator that accepts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as `owner`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
        self.tokens.insert(token.into(), owner);
        self
    }

    /// Enables or disables unsigned development tokens.
    #[must_use]
    pub const fn with_dev_tokens(mut self, enabled: bool) -> Self {
        self.dev_tokens = enabled;
        self
    }

    /// Returns true if development tokens are accepted.
    #[must_use]
    pub const fn accepts_dev_tokens(&self) -> bool {
        self.dev_tokens
    }
}

impl OwnerAuthenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<OwnerId, AuthError> {
        if let Some(owner) = self.tokens.get(token) {
            return Ok(owner.clone());
        }
        if self.dev_tokens && token.ends_with(DEV_TOKEN_SUFFIX) {
            return dev_token_owner(token);
        }
        Err(AuthError::InvalidToken)
    }
}

#[derive(Deserialize)]
struct DevClaims {
    #[serde(default)]
    sub: Option<String>,
}

/// Reads the owner from an unsigned development token.
///
/// The payload is base64url JSON; a missing or blank `sub` falls back to
/// [`DEV_OWNER_ID`].
///
/// # Errors
///
/// Returns `AuthError::InvalidDevToken` if the payload cannot be decoded.
pub fn dev_token_owner(token: &str) -> Result<OwnerId, AuthError> {
    let payload = token.split('.').nth(1).ok_or(AuthError::InvalidDevToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::InvalidDevToken)?;
    let claims: DevClaims =
        serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidDevToken)?;

    let sub = claims
        .sub
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEV_OWNER_ID.to_string());
    OwnerId::parse(&sub).map_err(|_| AuthError::InvalidDevToken)
}

/// Builds an unsigned development token for `sub`.
#[must_use]
pub fn create_dev_token(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": sub }).to_string());
    format!("{header}.{payload}{DEV_TOKEN_SUFFIX}")
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
///
/// # Errors
///
/// Returns `AuthError::MissingToken` for a missing or empty token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// The owner making the request, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedOwner(pub OwnerId);

impl FromRequestParts<AppState> for AuthenticatedOwner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;
        let owner = state.authenticator().authenticate(token)?;
        Ok(Self(owner))
    }
}
