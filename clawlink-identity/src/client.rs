//! HTTP client for the linker backend.

use std::time::Duration;

use clawlink::{BotId, EncodedPublicKey};
use clawlink_attestation::OwnershipAttestation;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Registration request sent to `POST /api/clawbots/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    /// Bot public key, `ed25519:<base64>`
    pub public_key: &'a str,
    /// Display name
    pub name: &'a str,
    /// Where the backend should push the attestation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'a str>,
}

/// Registration result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Assigned bot id
    #[serde(alias = "clawbotId")]
    pub bot_id: String,
    /// Six-digit claim code to show the human
    pub claim_code: String,
    /// When the code expires
    pub expires_at: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the linker backend on the bot's behalf.
#[derive(Debug, Clone)]
pub struct LinkerClient {
    http: reqwest::Client,
    base_url: String,
}

impl LinkerClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Client` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers this bot and obtains a claim code.
    ///
    /// # Errors
    ///
    /// - `Request` - the backend could not be reached
    /// - `Registration` - the backend rejected the request
    pub async fn register(
        &self,
        public_key: &EncodedPublicKey,
        name: &str,
        endpoint: Option<&str>,
    ) -> Result<RegisterResponse, IdentityError> {
        let url = format!("{}/api/clawbots/register", self.base_url);
        let request = RegisterRequest {
            public_key: public_key.as_str(),
            name,
            endpoint,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return Err(IdentityError::Registration {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| request_error(&url, &e))
    }

    /// Fetches the stored attestation for `bot_id`, or `None` if the bot is
    /// not claimed yet.
    ///
    /// # Errors
    ///
    /// - `Request` - the backend could not be reached or sent garbage
    /// - `UnexpectedResponse` - any status other than 200 or 404
    pub async fn fetch_attestation(
        &self,
        bot_id: &BotId,
    ) -> Result<Option<OwnershipAttestation>, IdentityError> {
        let url = format!("{}/api/clawbots/{bot_id}/attestation", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| request_error(&url, &e)),
            status => Err(IdentityError::UnexpectedResponse {
                url,
                status: status.as_u16(),
            }),
        }
    }
}

fn request_error(url: &str, err: &reqwest::Error) -> IdentityError {
    IdentityError::Request {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
