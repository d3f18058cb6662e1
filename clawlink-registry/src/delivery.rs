//! Best-effort push of a fresh attestation to the bot's identity server.

use std::time::Duration;

use clawlink::{BotEndpoint, BotId};
use clawlink_attestation::OwnershipAttestation;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::DeliveryError;

/// Route on the bot's identity server that receives attestations.
pub const ATTESTATION_ROUTE: &str = "attestation";

/// Posts attestations to `<endpoint>/attestation` with a bounded timeout.
///
/// A single attempt, no retries. Failures are logged and otherwise ignored;
/// the bot can re-fetch its attestation from the backend.
#[derive(Debug, Clone)]
pub struct AttestationDelivery {
    client: reqwest::Client,
    timeout: Duration,
}

impl AttestationDelivery {
    /// Creates a delivery client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Client` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Posts the attestation and waits for the bot's answer.
    ///
    /// # Errors
    ///
    /// - `Request` - connection failure or timeout
    /// - `Rejected` - the bot answered with a non-2xx status
    pub async fn deliver(
        &self,
        endpoint: &BotEndpoint,
        attestation: &OwnershipAttestation,
    ) -> Result<(), DeliveryError> {
        let url = endpoint.route(ATTESTATION_ROUTE);
        let response = self
            .client
            .post(&url)
            .json(attestation)
            .send()
            .await
            .map_err(|e| DeliveryError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected {
                url,
                status: status.as_u16(),
            })
        }
    }

    /// Starts delivery in the background and returns immediately.
    ///
    /// Returns `None` (after logging) when called outside a Tokio runtime.
    #[must_use]
    pub fn dispatch(
        &self,
        bot_id: BotId,
        endpoint: BotEndpoint,
        attestation: OwnershipAttestation,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(bot_id = %bot_id, "no async runtime; attestation not delivered");
            return None;
        };

        let delivery = self.clone();
        Some(runtime.spawn(async move {
            match delivery.deliver(&endpoint, &attestation).await {
                Ok(()) => info!(bot_id = %bot_id, endpoint = %endpoint, "attestation delivered"),
                Err(err) => warn!(
                    bot_id = %bot_id,
                    error = %err,
                    "attestation delivery failed; the bot can re-fetch it"
                ),
            }
        }))
    }
}
